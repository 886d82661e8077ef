
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};
use gumdrop::Options;
use tracing::info;

use topaz_wrapper::grid::{self, CompositeSource, Gallery, GridGeometry};
use topaz_wrapper::logging::{self, ResultExt};


/// Tools for particle galleries
#[derive(Options)]
struct Args {

	#[options(help_flag)]
	help: bool,

	/// settings for log output
	#[options(default_expr = "logging::DEFAULT_FILTER.to_string()")]
	log: String,

	#[options(command)]
	cmd: Option<Command>
}

#[derive(Options)]
enum Command {

	/// Write the center of every tile, for every micrograph in a folder
	Centers(CentersArgs),

	/// Build a test micrograph from tiles drawn at random from several galleries
	Composite(CompositeArgs)
}


#[derive(Options)]
struct CentersArgs {

	#[options(help_flag)]
	help: bool,

	/// rows of tiles in each micrograph
	#[options(default = "16")]
	rows: u32,

	/// columns of tiles in each micrograph
	#[options(default = "15")]
	cols: u32,

	/// tile width, in pixels
	#[options(no_short, default = "88")]
	tile_width: u32,

	/// tile height, in pixels
	#[options(no_short, default = "88")]
	tile_height: u32,

	/// where to write the particle coordinates
	#[options(default = "particles.txt", parse(try_from_str))]
	out: PathBuf,

	/// folder of micrographs
	#[options(free, required, parse(try_from_str))]
	micrographs: PathBuf
}


#[derive(Options)]
struct CompositeArgs {

	#[options(help_flag)]
	help: bool,

	/// rows of tiles in each gallery, and in the composite
	#[options(default = "16")]
	rows: u32,

	/// columns of tiles in each gallery, and in the composite
	#[options(default = "15")]
	cols: u32,

	/// folder for the outputs
	#[options(default = ".", parse(try_from_str))]
	out_dir: PathBuf,

	/// name of the composite image, also used in the particle files
	#[options(default = "composite_particles")]
	name: String,

	/// seed for the random tile choices
	seed: Option<u64>,

	/// galleries to draw from, as label:tile_size:path.mrc
	#[options(free, parse(try_from_str))]
	sources: Vec<CompositeSource>
}


fn main() -> ExitCode {

	let args = Args::parse_args_default_or_exit();

	let Ok(_) = logging::init(&args.log)
		.log_err()
		else { return ExitCode::FAILURE; };

	let result = match args.cmd {
		Some(Command::Centers(args)) => centers(args),
		Some(Command::Composite(args)) => composite(args),
		None => {
			println!("No command, try one of:\n{}", Args::command_list().unwrap_or_default());
			return ExitCode::FAILURE;
		}
	};

	let Ok(_) = result
		.log_err()
		else { return ExitCode::FAILURE; };

	ExitCode::SUCCESS
}


#[tracing::instrument(skip_all, level = 5, name = "Centers")]
fn centers(args: CentersArgs) -> Result<()> {

	let geometry = GridGeometry {
		rows: args.rows,
		cols: args.cols,
		tile_width: args.tile_width,
		tile_height: args.tile_height
	};

	let table = grid::calc_centers(&geometry, &args.micrographs)?;
	table.write(&args.out)?;
	info!("Center coordinates saved to '{}'", args.out.to_string_lossy());

	Ok(())
}


#[tracing::instrument(skip_all, level = 5, name = "Composite")]
fn composite(args: CompositeArgs) -> Result<()> {

	if args.sources.is_empty() {
		bail!("No galleries given, add some as label:tile_size:path.mrc");
	}

	let galleries = args.sources.iter()
		.map(|source| Gallery::load(source, args.rows, args.cols))
		.collect::<Result<Vec<_>>>()?;

	let mut rng = grid::rng(args.seed);
	let composite = grid::build_composite(&galleries, args.rows, args.cols, &args.name, &mut rng)?;
	composite.save(&args.out_dir, &args.name)?;

	Ok(())
}
