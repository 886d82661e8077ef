
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use toml::Table;


pub const DEFAULT_PATH: &'static str = "./sys_params.toml";


/// SysParams is the contents of sys_params.toml:
/// site-wide settings that don't change between experiments.
#[derive(Debug, Clone, PartialEq)]
pub struct SysParams {
	pub file_paths: SysFilePaths,
	pub parameters: SysParameters,
	pub commands: SysCommands
}

/// File names of the stage artifacts, relative to the output (or model) folder.
#[derive(Debug, Clone, PartialEq)]
pub struct SysFilePaths {
	pub processed_images_path: String,
	pub processed_images: String,
	pub processed_particles: String,
	pub train_images: String,
	pub train_targets: String,
	pub test_images: String,
	pub test_targets: String,
	pub save_prefix: String,
	pub model_file_path: String,
	pub model: String,
	pub predicted_particles: String,
	pub scripts_path: String
}

#[derive(Debug, Clone, PartialEq)]
pub struct SysParameters {
	/// 0 writes the logs to files only, anything else echoes them to the console too
	pub verbosity: u32,
	pub system: String
}

#[derive(Debug, Clone, PartialEq)]
pub struct SysCommands {
	pub topaz: String,
	pub python: String
}

impl Default for SysCommands {
	fn default() -> Self {
		Self {
			topaz: "topaz".to_string(),
			python: "python3".to_string()
		}
	}
}


impl SysParams {

	pub fn read(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let toml = fs::read_to_string(path)
			.with_context(|| format!("Failed to read system parameters at: {}", path.to_string_lossy()))?;
		Self::parse(&toml)
			.with_context(|| format!("Failed to parse system parameters at: {}", path.to_string_lossy()))
	}

	pub fn parse(toml: impl AsRef<str>) -> Result<Self> {

		let toml = toml.as_ref()
			.parse::<Table>()
			.context("System parameters are not valid TOML")?;

		let file_paths = {
			let table = table(&toml, "file_paths")?;
			SysFilePaths {
				processed_images_path: string(table, "file_paths", "processed_images_path")?,
				processed_images: string(table, "file_paths", "processed_images")?,
				processed_particles: string(table, "file_paths", "processed_particles")?,
				train_images: string(table, "file_paths", "train_images")?,
				train_targets: string(table, "file_paths", "train_targets")?,
				test_images: string(table, "file_paths", "test_images")?,
				test_targets: string(table, "file_paths", "test_targets")?,
				save_prefix: string(table, "file_paths", "save_prefix")?,
				model_file_path: string(table, "file_paths", "model_file_path")?,
				model: string(table, "file_paths", "model")?,
				predicted_particles: string(table, "file_paths", "predicted_particles")?,
				scripts_path: string(table, "file_paths", "scripts_path")?
			}
		};

		let parameters = {
			let table = table(&toml, "parameters")?;
			let verbosity = table.get("verbosity")
				.context("Missing parameters.verbosity")?
				.as_integer()
				.context("parameters.verbosity was not an integer")?;
			SysParameters {
				verbosity: u32::try_from(verbosity)
					.with_context(|| format!("parameters.verbosity was out of range: {}", verbosity))?,
				system: string(table, "parameters", "system")?
			}
		};

		// the commands section is optional, everything in it has a default
		let commands = match toml.get("commands") {
			None => SysCommands::default(),
			Some(commands) => {
				let table = commands.as_table()
					.context("commands key is not a table")?;
				let defaults = SysCommands::default();
				SysCommands {
					topaz: optional_string(table, "commands", "topaz")?
						.unwrap_or(defaults.topaz),
					python: optional_string(table, "commands", "python")?
						.unwrap_or(defaults.python)
				}
			}
		};

		Ok(SysParams {
			file_paths,
			parameters,
			commands
		})
	}

	pub fn echo(&self) -> bool {
		self.parameters.verbosity > 0
	}

	pub fn is_macos(&self) -> bool {
		self.parameters.system.eq_ignore_ascii_case("macos")
	}
}


fn table<'a>(toml: &'a Table, name: &str) -> Result<&'a Table> {
	toml.get(name)
		.with_context(|| format!("Missing [{}] section from system parameters", name))?
		.as_table()
		.with_context(|| format!("{} key is not a table", name))
}


fn string(table: &Table, section: &str, key: &str) -> Result<String> {
	optional_string(table, section, key)?
		.with_context(|| format!("Missing {}.{}", section, key))
}


fn optional_string(table: &Table, section: &str, key: &str) -> Result<Option<String>> {
	table.get(key)
		.map(|value| {
			value.as_str()
				.map(String::from)
				.with_context(|| format!("{}.{} was not a string", section, key))
		})
		.transpose()
}
