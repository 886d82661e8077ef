
mod preprocess;
mod convert;
mod train_test_split;
mod train;
mod extract;
mod visualize_picks;


use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::config::{Config, ConfigPipeline};
use crate::journal::Journal;
use crate::shell::Shell;
use crate::sysparams::SysParams;
use crate::template::Placeholders;


/// The pipeline stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	Preprocess,
	Convert,
	TrainTestSplit,
	Train,
	Extract,
	VisualizePicks
}

impl Stage {

	pub const ALL: [Stage; 6] = [
		Stage::Preprocess,
		Stage::Convert,
		Stage::TrainTestSplit,
		Stage::Train,
		Stage::Extract,
		Stage::VisualizePicks
	];

	pub fn id(&self) -> &'static str {
		match self {
			Stage::Preprocess => preprocess::STAGE_ID,
			Stage::Convert => convert::STAGE_ID,
			Stage::TrainTestSplit => train_test_split::STAGE_ID,
			Stage::Train => train::STAGE_ID,
			Stage::Extract => extract::STAGE_ID,
			Stage::VisualizePicks => visualize_picks::STAGE_ID
		}
	}

	pub fn enabled(&self, pipeline: &ConfigPipeline) -> bool {
		match self {
			Stage::Preprocess => pipeline.run_preprocess,
			Stage::Convert => pipeline.run_convert,
			Stage::TrainTestSplit => pipeline.run_split_test_train,
			Stage::Train => pipeline.run_train,
			Stage::Extract => pipeline.run_extract,
			Stage::VisualizePicks => pipeline.run_visualize_picks
		}
	}

	/// Builds the command line for this stage. Doesn't touch the filesystem.
	pub fn command(&self, ctx: &StageContext) -> Result<String> {
		match self {
			Stage::Preprocess => preprocess::command(ctx),
			Stage::Convert => convert::command(ctx),
			Stage::TrainTestSplit => train_test_split::command(ctx),
			Stage::Train => train::command(ctx),
			Stage::Extract => extract::command(ctx),
			Stage::VisualizePicks => visualize_picks::command(ctx)
		}
	}

	#[tracing::instrument(skip_all, level = 5, name = "Stage", fields(id = self.id()))]
	pub fn run(&self, ctx: &StageContext, shell: &Shell, journal: &Journal) -> Result<()> {

		let id = self.id();

		// some stages need their output folders to exist beforehand
		match self {
			Stage::Preprocess => preprocess::prepare(ctx, journal)?,
			Stage::Convert => convert::prepare(ctx, journal)?,
			_ => ()
		}

		let command = self.command(ctx)?;

		let start = Instant::now();
		shell.run(journal, &command)?;
		let duration = start.elapsed().as_secs_f64();

		journal.info(id, format!("Function '{}' took {:.2} seconds to complete", id, duration));
		journal.perf(ctx.output_dir()?, id, "duration", format!("{:.2}", duration), "seconds");

		if let Stage::Extract = self {
			extract::report(ctx, journal);
		}

		Ok(())
	}
}


/// Runs every enabled stage, in order, stopping at the first failure or at SIGTERM.
pub fn run_pipeline(ctx: &StageContext, shell: &Shell, journal: &Journal) -> Result<()> {

	for stage in Stage::ALL {

		if !stage.enabled(&ctx.config.pipeline) {
			info!("skipping stage: {}", stage.id());
			continue;
		}

		if shell.terminated() {
			bail!("Terminated by signal, not starting stage: {}", stage.id());
		}

		info!("running stage: {}", stage.id());
		stage.run(ctx, shell, journal)
			.context(format!("Stage failed: {}", stage.id()))?;
	}

	// a signal during the last stage's bookkeeping still counts
	if shell.terminated() {
		bail!("Terminated by signal");
	}

	Ok(())
}


/// Everything a stage needs to build its command.
pub struct StageContext<'a> {
	pub config: &'a Config,
	pub sys: &'a SysParams,
	pub placeholders: Placeholders
}

impl<'a> StageContext<'a> {

	pub fn new(config: &'a Config, sys: &'a SysParams) -> Self {
		Self {
			config,
			sys,
			placeholders: Placeholders::from_config(config)
		}
	}

	pub fn output_dir(&self) -> Result<String> {
		self.placeholders.fill(&self.config.output.dir)
	}

	/// a file in the output folder
	pub fn output_path(&self, file: impl AsRef<str>) -> Result<String> {
		self.placeholders.resolve(&self.config.output.dir, file)
	}

	/// a file in the model folder
	pub fn model_path(&self, file: impl AsRef<str>) -> Result<String> {
		self.placeholders.resolve(&self.config.output.model_file_save_path, file)
	}

	pub fn topaz(&self, subcommand: &str) -> String {
		format!("{} {}", self.sys.commands.topaz, subcommand)
	}
}


fn ensure_dir_exists(journal: &Journal, dir: impl AsRef<Path>) -> Result<()> {
	let dir = dir.as_ref();
	if !dir.exists() {
		fs::create_dir_all(dir)
			.context(format!("Failed to create folder: {}", dir.to_string_lossy()))?;
		journal.info("ensure_directory_exists", format!("Directory '{}' created.", dir.to_string_lossy()));
	}
	Ok(())
}
