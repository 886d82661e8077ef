
// SIGTERM reaches every handler in the process, so this test gets its own binary

use galvanic_assert::{assert_that, matchers::*};
use signal_hook::consts::SIGTERM;

use topaz_wrapper::config::Config;
use topaz_wrapper::journal::Journal;
use topaz_wrapper::logging;
use topaz_wrapper::shell::Shell;
use topaz_wrapper::stages::{self, StageContext};
use topaz_wrapper::sysparams::SysParams;

mod util;

use crate::util::fixtures::ALL_STAGES;
use crate::util::work_dir::WorkDir;


#[test]
fn sigterm_between_stages_stops_the_pipeline() {
	let _logging = logging::init_test();

	let dir = WorkDir::project("true", &ALL_STAGES);
	let config = Config::read(dir.file("config.json").path())
		.unwrap();
	let sys = SysParams::read(dir.file("sys_params.toml").path())
		.unwrap();
	let ctx = StageContext::new(&config, &sys);
	let journal = Journal::open(dir.file("event.log").path(), dir.file("perf.log").path(), false);
	let shell = Shell::new()
		.unwrap();

	// arrives while no command is running
	signal_hook::low_level::raise(SIGTERM)
		.unwrap();
	assert_that!(&shell.terminated(), eq(true));

	let err = stages::run_pipeline(&ctx, &shell, &journal)
		.unwrap_err();
	assert!(err.to_string().contains("execute_preprocess"), "unexpected error: {}", err);

	let events = dir.file("event.log").read();
	assert!(!events.contains("launch_shell_script"), "events:\n{}", events);
}
