
use std::fs;
use std::path::{Path, PathBuf};

use assert_fs::TempDir;

use topaz_wrapper::journal;

use super::fixtures;


/// A scratch folder for one test, removed when dropped.
pub struct WorkDir {
	dir: TempDir
}

impl WorkDir {

	pub fn new() -> WorkDir {
		Self {
			dir: TempDir::new()
				.expect("Failed to make temp folder")
		}
	}

	pub fn path(&self) -> &Path {
		self.dir.path()
	}

	pub fn file(&self, path: impl AsRef<Path>) -> WorkFile {
		WorkFile {
			_dir: self,
			path: self.dir.path().join(path.as_ref())
		}
	}

	pub fn print(&self) {
		let path = self.dir.path();
		println!("Work Folder: {}", path.to_string_lossy());
		let dir = fs::read_dir(path)
			.expect(&format!("Failed to read dir: {}", path.to_string_lossy()));
		for entry in dir {
			match entry {
				Ok(entry) => println!("\t{}", entry.file_name().to_string_lossy()),
				Err(e) => println!("\tError: {}", e)
			}
		}
	}
}

/// Project files, as `topaz-run` expects to find them in its working folder.
impl WorkDir {

	/// A project folder with system parameters and a config file rooted here.
	pub fn project(topaz: &str, enabled: &[&str]) -> WorkDir {
		let dir = WorkDir::new();
		dir.write_sys_params(topaz);
		dir.write_config(enabled);
		dir
	}

	pub fn write_sys_params(&self, topaz: &str) -> WorkFile {
		let file = self.file("sys_params.toml");
		file.write(fixtures::sys_params_toml(topaz, "linux"));
		file
	}

	pub fn write_config(&self, enabled: &[&str]) -> WorkFile {
		let file = self.file("config.json");
		file.write(fixtures::config_json(self.path().to_string_lossy(), enabled));
		file
	}

	/// The output folder the fixture config points at.
	pub fn out_dir(&self) -> PathBuf {
		self.path().join(fixtures::OUT)
	}

	pub fn events(&self) -> String {
		self.file(journal::DEFAULT_EVENT_LOG).read()
	}

	pub fn perf_lines(&self) -> Vec<String> {
		self.file(journal::DEFAULT_PERF_LOG).lines()
	}
}

impl AsRef<Path> for WorkDir {
	fn as_ref(&self) -> &Path {
		self.dir.path()
	}
}


pub struct WorkFile<'d> {
	_dir: &'d WorkDir,
	path: PathBuf
}

impl<'d> WorkFile<'d> {

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn path_str(&self) -> String {
		self.path.to_string_lossy().to_string()
	}

	pub fn write(&self, txt: impl AsRef<str>) {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent)
				.expect(&format!("Failed to create dir: {}", parent.to_string_lossy()));
		}
		fs::write(self.path(), txt.as_ref())
			.expect(&format!("Failed to write file: {}", self.path().to_string_lossy()));
	}

	pub fn exists(&self) -> bool {
		self.path.exists()
	}

	pub fn read(&self) -> String {
		fs::read_to_string(self.path())
			.expect(&format!("Failed to read file: {}", self.path().to_string_lossy()))
	}

	pub fn lines(&self) -> Vec<String> {
		self.read()
			.lines()
			.map(String::from)
			.collect()
	}
}
