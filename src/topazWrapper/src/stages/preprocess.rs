
use anyhow::Result;

use crate::journal::Journal;
use crate::stages::{ensure_dir_exists, StageContext};


pub const STAGE_ID: &'static str = "execute_preprocess";


pub fn prepare(ctx: &StageContext, journal: &Journal) -> Result<()> {
	let out_dir = ctx.output_path(&ctx.sys.file_paths.processed_images_path)?;
	ensure_dir_exists(journal, out_dir)
}


/// downsample and normalize the raw micrographs
pub fn command(ctx: &StageContext) -> Result<String> {

	let downsampling = ctx.config.parameters.downsampling;
	let out_dir = ctx.output_path(&ctx.sys.file_paths.processed_images_path)?;
	let raw_images = ctx.placeholders.fill(&ctx.config.input.rawdata_images)?;

	Ok(format!("{} -v -s {} -o {} {}",
		ctx.topaz("preprocess"),
		downsampling,
		out_dir,
		raw_images
	))
}
