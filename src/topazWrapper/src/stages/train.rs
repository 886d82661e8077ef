
use anyhow::Result;

use crate::stages::StageContext;


pub const STAGE_ID: &'static str = "execute_train";


pub fn command(ctx: &StageContext) -> Result<String> {

	let files = &ctx.sys.file_paths;
	let params = &ctx.config.parameters;

	// topaz's entry point can't import torch on macOS, so run the training script directly there
	let exe =
		if ctx.sys.is_macos() {
			format!("{} {}/topaz/topaz/commands/train.py", ctx.sys.commands.python, ctx.config.input.base_program_path)
		} else {
			ctx.topaz("train")
		};

	Ok([
		exe,
		format!("-n {}", params.number_of_predicted_particles),
		format!("-r {}", params.train_radius),
		format!("--num-workers={}", params.number_workers),
		format!("--train-images {}", ctx.output_path(&files.train_images)?),
		format!("--train-targets {}", ctx.output_path(&files.train_targets)?),
		format!("--test-images {}", ctx.output_path(&files.test_images)?),
		format!("--test-targets {}", ctx.output_path(&files.test_targets)?),
		format!("--save-prefix {}", ctx.model_path(&files.save_prefix)?),
		format!("-o {}", ctx.model_path(&files.model_file_path)?)
	].join(" "))
}
