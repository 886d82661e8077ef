
use anyhow::Result;

use crate::stages::StageContext;


pub const STAGE_ID: &'static str = "execute_train_test_split";


pub fn command(ctx: &StageContext) -> Result<String> {

	let files = &ctx.sys.file_paths;
	let num_held_out = ctx.config.parameters.number_of_held_out_test_images;

	Ok(format!("{} -n {} --image-dir {} {}",
		ctx.topaz("train_test_split"),
		num_held_out,
		ctx.output_path(&files.processed_images_path)?,
		ctx.output_path(&files.processed_particles)?
	))
}
