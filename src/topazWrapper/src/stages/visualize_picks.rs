
use anyhow::Result;

use crate::stages::StageContext;


pub const STAGE_ID: &'static str = "execute_visualize_picks";

const SCRIPT: &'static str = "visualize_picks.py";


/// overlay the predicted particles on the ground truth, using the plotting script
pub fn command(ctx: &StageContext) -> Result<String> {

	let files = &ctx.sys.file_paths;
	let params = &ctx.config.parameters;
	let program = &ctx.config.input.base_program_path;

	Ok([
		format!("{} {}{}{}", ctx.sys.commands.python, program, files.scripts_path, SCRIPT),
		program.clone(),
		ctx.output_dir()?,
		ctx.output_path(&files.predicted_particles)?,
		ctx.output_path(&files.processed_particles)?,
		ctx.output_path(&files.processed_images_path)?,
		ctx.output_path(&files.test_images)?,
		params.extract_radius.to_string(),
		params.number_of_images_to_visualize.to_string(),
		params.display_plots.to_string(),
		params.score.to_string()
	].join(" "))
}
