
use anyhow::Result;

use crate::journal::Journal;
use crate::stages::{ensure_dir_exists, StageContext};


pub const STAGE_ID: &'static str = "execute_convert";


pub fn prepare(ctx: &StageContext, journal: &Journal) -> Result<()> {
	ensure_dir_exists(journal, ctx.output_dir()?)
}


/// scale the particle coordinates to match the downsampled micrographs
pub fn command(ctx: &StageContext) -> Result<String> {

	let downsampling = ctx.config.parameters.downsampling;
	let out_file = ctx.output_path(&ctx.sys.file_paths.processed_particles)?;
	let raw_particles = ctx.placeholders.fill(&ctx.config.input.rawdata_particles)?;

	Ok(format!("{} -s {} -o {} {}",
		ctx.topaz("convert"),
		downsampling,
		out_file,
		raw_particles
	))
}
