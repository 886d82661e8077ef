
// The journal is the pipeline's own record of what happened, kept next to the data:
//   an event log:       [MM/DD/YYYY, HH:MM:SS] [module] message
//   a performance log:  MM/DD/YYYY, HH:MM:SS,project,module,metric,value,unit
// Both files are append-only and shared by every run started from the same folder.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use time::format_description::FormatItem;
use time::macros::format_description;
use tracing::{info, warn};

use crate::logging;
use crate::logging::ResultExt;


pub const DEFAULT_EVENT_LOG: &'static str = "topaz_event.log";
pub const DEFAULT_PERF_LOG: &'static str = "topaz_perf.log";

const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!(
	"[month]/[day]/[year], [hour]:[minute]:[second]"
);


pub struct Journal {
	event_log: Option<LogFile>,
	perf_log: Option<LogFile>,
	echo: bool
}

struct LogFile {
	name: String,
	file: File
}

impl Journal {

	/// Opens (or creates) both log files for appending.
	/// A log file that can't be opened is reported on the console and then ignored,
	/// so the journal never stops the pipeline.
	pub fn open(event_path: impl AsRef<Path>, perf_path: impl AsRef<Path>, echo: bool) -> Self {

		let journal = Self {
			event_log: LogFile::open(event_path).warn_err().ok(),
			perf_log: LogFile::open(perf_path).warn_err().ok(),
			echo
		};

		let ts = timestamp();
		if journal.event_log.is_some() {
			journal.event(format!("[{}] Initialized eventlog", ts));
		}
		if journal.perf_log.is_some() {
			journal.event(format!("[{}] Initialized perflog", ts));
		}

		journal
	}

	pub fn info(&self, module: impl AsRef<str>, msg: impl AsRef<str>) {
		self.event(format!("[{}] [{}] {}", timestamp(), module.as_ref(), msg.as_ref()));
	}

	pub fn perf(
		&self,
		project: impl AsRef<str>,
		module: impl AsRef<str>,
		metric: impl AsRef<str>,
		value: impl AsRef<str>,
		unit: impl AsRef<str>
	) {
		let line = format!("{},{},{},{},{},{}",
			timestamp(),
			project.as_ref(),
			module.as_ref(),
			metric.as_ref(),
			value.as_ref(),
			unit.as_ref()
		);
		if let Some(perf_log) = &self.perf_log {
			perf_log.append(&line);
		}
		if self.echo {
			info!("{}", line);
		}
	}

	pub fn close(self) {
		self.event(format!("[{}] [Logger.close] log files closed", timestamp()));
		// files close on drop
	}

	fn event(&self, line: String) {
		if let Some(event_log) = &self.event_log {
			event_log.append(&line);
		}
		if self.echo {
			info!("{}", line);
		}
	}
}


impl LogFile {

	fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let file = OpenOptions::new()
			.create(true)
			.append(true)
			.open(path)
			.context(format!("Failed to open log file: {}", path.to_string_lossy()))?;
		Ok(Self {
			name: path.to_string_lossy().to_string(),
			file
		})
	}

	fn append(&self, line: &str) {
		let result = (&self.file).write_all(format!("{}\n", line).as_bytes());
		if let Err(e) = result {
			warn!("Failed to write to log file {}: {}", self.name, e);
		}
	}
}


fn timestamp() -> String {
	logging::now_local()
		.format(TIMESTAMP_FORMAT)
		.unwrap_or_else(|_| "??/??/????, ??:??:??".to_string())
}
