
use std::path::Path;

use anyhow::Result;

use crate::journal::Journal;
use crate::logging::ResultExt;
use crate::particles::ParticleTable;
use crate::stages::StageContext;


pub const STAGE_ID: &'static str = "execute_extract";


pub fn command(ctx: &StageContext) -> Result<String> {

	let files = &ctx.sys.file_paths;

	Ok(format!("{} -r {} -m {} -o {} {}",
		ctx.topaz("extract"),
		ctx.config.parameters.extract_radius,
		ctx.model_path(&files.model)?,
		ctx.output_path(&files.predicted_particles)?,
		ctx.output_path(&files.processed_images)?
	))
}


/// Counts the predictions that clear the score threshold, if topaz wrote any.
pub fn report(ctx: &StageContext, journal: &Journal) {

	let Ok(path) = ctx.output_path(&ctx.sys.file_paths.predicted_particles)
		.warn_err()
		else { return; };
	if !Path::new(&path).exists() {
		return;
	}

	let Ok(table) = ParticleTable::read(&path)
		.warn_err()
		else { return; };
	let Ok(project) = ctx.output_dir()
		.warn_err()
		else { return; };

	let score = ctx.config.parameters.score as f64;
	let count = table.count_at_least(score);
	journal.info(STAGE_ID, format!("{} of {} predicted particles scored at least {}", count, table.particles.len(), score));
	journal.perf(project, STAGE_ID, "particles_above_score", count.to_string(), "count");
}
