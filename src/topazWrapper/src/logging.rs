
use std::io;
use std::ops::Deref;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use display_error_chain::ErrorChainExt;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing::{error, warn};
use tracing::dispatcher::DefaultGuard;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use tracing_subscriber::fmt::format::{Format, Full};
use tracing_subscriber::fmt::time::OffsetTime;


pub const DEFAULT_FILTER: &'static str = "topaz_wrapper=info,topaz_run=info,topaz_grid=info";

type ConsoleFormat = Format<Full,OffsetTime<&'static [FormatItem<'static>]>>;


/// Installs the console logger for the whole process.
/// Console output goes to stderr, the journal files are handled separately by `journal`.
pub fn init(filter: impl AsRef<str>) -> Result<()> {

	let filter = parse_filter(filter.as_ref())?;

	let subscriber = FmtSubscriber::builder()
		.with_env_filter(filter)
		.event_format(console_format())
		.with_writer(io::stderr)
		.finish();

	tracing::subscriber::set_global_default(subscriber)
		.context("Failed to set logging subscriber")?;

	Ok(())
}


/// Routes log output through the test harness, so it only shows up for failing tests.
/// Keep the guard alive for the duration of the test.
pub fn init_test() -> DefaultGuard {

	let subscriber = FmtSubscriber::builder()
		.with_env_filter(EnvFilter::new("trace"))
		.event_format(console_format())
		.with_test_writer()
		.finish();

	tracing::subscriber::set_default(subscriber)
}


fn parse_filter(filter: &str) -> Result<EnvFilter> {
	EnvFilter::builder()
		.parse(filter)
		.context(format!("Failed to parse log filter: {}", filter))
}


fn console_format() -> ConsoleFormat {

	let time_format = format_description!(
		version = 2,
		"[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:4] [offset_hour sign:mandatory]:[offset_minute]"
	);

	Format::default()
		.with_timer(OffsetTime::new(local_offset(), time_format))
		.with_target(false)
}


/// The local UTC offset, looked up once.
// NOTE: the offset lookup can fail once other threads exist (eg, the shell output readers),
//       so remember the first answer and fall back to UTC.
pub fn local_offset() -> UtcOffset {
	static OFFSET: OnceLock<UtcOffset> = OnceLock::new();
	*OFFSET.get_or_init(|| {
		UtcOffset::current_local_offset()
			.unwrap_or(UtcOffset::UTC)
	})
}


pub fn now_local() -> OffsetDateTime {
	OffsetDateTime::now_utc()
		.to_offset(local_offset())
}


pub trait ResultExt<T> {
	fn log_err(self) -> Result<T,()>;
	fn warn_err(self) -> Result<T,()>;
}

impl<T> ResultExt<T> for Result<T,anyhow::Error> {

	fn log_err(self) -> Result<T,()> {
		self.map_err(|e| {
			error!("{}", e.deref().chain());
			()
		})
	}

	fn warn_err(self) -> Result<T,()> {
		self.map_err(|e| {
			warn!("{}", e.deref().chain());
			()
		})
	}
}
