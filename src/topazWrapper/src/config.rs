
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};


/// Config is the contents of the user's JSON configuration file:
/// who the experiment is, where the data lives, which stages to run, and with what parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
	pub experiment: ConfigExperiment,
	pub input: ConfigInput,
	pub output: ConfigOutput,
	pub pipeline: ConfigPipeline,
	pub parameters: ConfigParameters
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigExperiment {
	pub specimen: String,
	pub session: String,
	pub run: String,
	pub slab_pick_run: String
}

/// Input paths may contain `{placeholder}` tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigInput {
	pub base_program_path: String,
	pub base_project_path: String,
	pub rawdata_images: String,
	pub rawdata_particles: String
}

/// Output paths may contain `{placeholder}` tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigOutput {
	pub dir: String,
	pub model_file_save_path: String
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigPipeline {
	pub run_preprocess: bool,
	pub run_convert: bool,
	pub run_split_test_train: bool,
	pub run_train: bool,
	pub run_extract: bool,
	pub run_visualize_picks: bool
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigParameters {
	pub box_size: u32,
	pub downsampling: u32,
	pub number_of_held_out_test_images: u32,
	pub number_of_predicted_particles: u32,
	pub number_workers: u32,
	pub train_radius: u32,
	pub extract_radius: u32,
	pub number_of_images_to_visualize: u32,
	pub display_plots: bool,
	/// log-likelihood ratio threshold, can be negative
	pub score: i64
}


impl Config {

	pub fn read(path: impl AsRef<Path>) -> Result<Self> {

		let path = path.as_ref();
		let json = match fs::read_to_string(path) {
			Ok(json) => json,
			Err(e) if e.kind() == ErrorKind::NotFound =>
				bail!("Config file not found: {}", path.to_string_lossy()),
			Err(e) => Err(e)
				.context(format!("Failed to read config file at: {}", path.to_string_lossy()))?
		};

		Self::parse(&json)
			.context(format!("Failed to parse config file at: {}", path.to_string_lossy()))
	}

	pub fn parse(json: impl AsRef<str>) -> Result<Self> {

		let root = serde_json::from_str::<Value>(json.as_ref())
			.context("Config is not valid JSON")?;
		let root = root.as_object()
			.context("Config is not a JSON object")?;

		let experiment = {
			let section = Section::get(root, "experiment")?;
			ConfigExperiment {
				specimen: section.string("specimen")?,
				session: section.string("session")?,
				run: section.string("run")?,
				slab_pick_run: section.string("slabPickRun")?
			}
		};

		let input = {
			let section = Section::get(root, "input")?;
			ConfigInput {
				base_program_path: section.string("base_program_path")?,
				base_project_path: section.string("base_project_path")?,
				rawdata_images: section.string("rawdata_images")?,
				rawdata_particles: section.string("rawdata_particles")?
			}
		};

		let output = {
			let section = Section::get(root, "output")?;
			// older config files spell the model path the other way around
			let model_file_save_path = match section.has("model_file_save_path") {
				true => section.string("model_file_save_path")?,
				false => section.string("file_save_model_path")
					.context("Missing output.model_file_save_path")?
			};
			ConfigOutput {
				dir: section.string("dir")?,
				model_file_save_path
			}
		};

		let pipeline = {
			let section = Section::get(root, "pipeline")?;
			ConfigPipeline {
				run_preprocess: section.toggle("run_preprocess")?,
				run_convert: section.toggle("run_convert")?,
				run_split_test_train: section.toggle("run_split_test_train")?,
				run_train: section.toggle("run_train")?,
				run_extract: section.toggle("run_extract")?,
				run_visualize_picks: section.toggle("run_visualize_picks")?
			}
		};

		let parameters = {
			let section = Section::get(root, "parameters")?;
			ConfigParameters {
				box_size: section.u32("boxSize")?,
				downsampling: section.u32("downsampling")?,
				number_of_held_out_test_images: section.u32("number_of_held_out_test_images")?,
				number_of_predicted_particles: section.u32("number_of_predicted_particles")?,
				number_workers: section.u32("number_workers")?,
				train_radius: section.u32("train_radius")?,
				extract_radius: section.u32("extract_radius")?,
				number_of_images_to_visualize: section.u32("number_of_images_to_visualize")?,
				display_plots: section.flag("display_plots")?,
				score: section.i64("score")?
			}
		};

		Ok(Config {
			experiment,
			input,
			output,
			pipeline,
			parameters
		})
	}
}


struct Section<'a> {
	name: &'static str,
	obj: &'a Map<String,Value>
}

impl<'a> Section<'a> {

	fn get(root: &'a Map<String,Value>, name: &'static str) -> Result<Self> {
		let obj = root.get(name)
			.context(format!("Missing {} section from config file", name))?
			.as_object()
			.context(format!("{} is not an object", name))?;
		Ok(Self {
			name,
			obj
		})
	}

	fn has(&self, key: &str) -> bool {
		self.obj.contains_key(key)
	}

	fn value(&self, key: &str) -> Result<&'a Value> {
		self.obj.get(key)
			.context(format!("Missing {}.{}", self.name, key))
	}

	fn string(&self, key: &str) -> Result<String> {
		let s = self.value(key)?
			.as_str()
			.context(format!("{}.{} was not a string", self.name, key))?;
		Ok(s.to_string())
	}

	fn i64(&self, key: &str) -> Result<i64> {
		self.value(key)?
			.as_i64()
			.context(format!("{}.{} was not an integer", self.name, key))
	}

	fn u32(&self, key: &str) -> Result<u32> {
		let i = self.i64(key)?;
		u32::try_from(i)
			.context(format!("{}.{} was out of range: {}", self.name, key, i))
	}

	/// pipeline switches are "yes" or "no"
	fn toggle(&self, key: &str) -> Result<bool> {
		let s = self.string(key)?;
		match s.to_lowercase().as_str() {
			"yes" => Ok(true),
			"no" => Ok(false),
			_ => bail!("{}.{} should be \"yes\" or \"no\", not: {}", self.name, key, s)
		}
	}

	/// either a JSON boolean, or the strings "true" and "false"
	fn flag(&self, key: &str) -> Result<bool> {
		let value = self.value(key)?;
		if let Some(b) = value.as_bool() {
			return Ok(b);
		}
		let s = value.as_str()
			.context(format!("{}.{} was not a boolean", self.name, key))?;
		match s.to_lowercase().as_str() {
			"true" => Ok(true),
			"false" => Ok(false),
			_ => bail!("{}.{} should be \"true\" or \"false\", not: {}", self.name, key, s)
		}
	}
}
