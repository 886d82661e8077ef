
use std::ops::Deref;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};
use display_error_chain::ErrorChainExt;
use gumdrop::Options;
use tracing::info;

use topaz_wrapper::config::Config;
use topaz_wrapper::journal::{self, Journal};
use topaz_wrapper::logging::{self, ResultExt};
use topaz_wrapper::shell::Shell;
use topaz_wrapper::stages::{self, StageContext};
use topaz_wrapper::sysparams::{self, SysParams};


/// Runs the topaz particle picking pipeline described by a configuration file
#[derive(Options)]
struct Args {

	#[options(help_flag)]
	help: bool,

	/// settings for log output
	#[options(default_expr = "logging::DEFAULT_FILTER.to_string()")]
	log: String,

	/// the system parameters file
	#[options(default_expr = "PathBuf::from(sysparams::DEFAULT_PATH)", parse(try_from_str))]
	sys_params: PathBuf,

	/// append events to this file
	#[options(default_expr = "PathBuf::from(journal::DEFAULT_EVENT_LOG)", parse(try_from_str))]
	event_log: PathBuf,

	/// append performance measurements to this file
	#[options(default_expr = "PathBuf::from(journal::DEFAULT_PERF_LOG)", parse(try_from_str))]
	perf_log: PathBuf,

	/// path to the JSON configuration file
	#[options(free)]
	config: String
}


fn main() -> ExitCode {

	// parse arguments
	let args = Args::parse_args_default_or_exit();

	// init logging
	let Ok(_) = logging::init(&args.log)
		.log_err()
		else { return ExitCode::FAILURE; };

	let Ok(_) = run(args)
		.log_err()
		else { return ExitCode::FAILURE; };

	// we finished! =)
	ExitCode::SUCCESS
}


#[tracing::instrument(skip_all, level = 5, name = "TopazRun")]
fn run(args: Args) -> Result<()> {

	// the system parameters decide how chatty the journal is, so read them first
	let sys = match SysParams::read(&args.sys_params) {
		Ok(sys) => sys,
		Err(e) => {
			let journal = Journal::open(&args.event_log, &args.perf_log, true);
			journal.info("main", format!("{} is missing or unreadable", args.sys_params.to_string_lossy()));
			journal.close();
			return Err(e);
		}
	};

	let journal = Journal::open(&args.event_log, &args.perf_log, sys.echo());

	let result = run_pipeline(&args, &sys, &journal);
	if let Err(e) = &result {
		journal.info("main", format!("Error: {}", e.deref().chain()));
	}

	journal.close();
	result
}


fn run_pipeline(args: &Args, sys: &SysParams, journal: &Journal) -> Result<()> {

	if args.config.is_empty() {
		journal.info("main", "config_file is missing");
		journal.info("main", "Usage: $ topaz-run path_to_config_file");
		bail!("No configuration file given");
	}

	let config = Config::read(&args.config)
		.inspect_err(|_| journal.info("main", format!("Error: Unable to read {}", args.config)))?;
	info!("experiment: {} {} {}", config.experiment.session, config.experiment.specimen, config.experiment.run);

	let shell = Shell::new()?;
	let ctx = StageContext::new(&config, sys);
	stages::run_pipeline(&ctx, &shell, journal)?;

	journal.info("topaz_run main", "All done... good bye");

	Ok(())
}
