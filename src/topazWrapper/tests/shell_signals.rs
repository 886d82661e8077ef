
// SIGTERM reaches every handler in the process, so these tests get their own binary

use std::fs;
use std::thread;
use std::time::{Duration, Instant};

use galvanic_assert::{assert_that, matchers::*};
use signal_hook::consts::SIGTERM;

use topaz_wrapper::journal::Journal;
use topaz_wrapper::logging;
use topaz_wrapper::shell::Shell;

mod util;

use crate::util::work_dir::WorkDir;


/// true if the process is gone, or only a zombie waiting to be reaped
fn is_dead(pid: &str) -> bool {
	match fs::read_to_string(format!("/proc/{}/stat", pid)) {
		Err(_) => true,
		Ok(stat) => stat.rsplit_once(')')
			.map(|(_, rest)| rest.trim_start().starts_with('Z'))
			.unwrap_or(false)
	}
}


#[test]
fn sigterm_stops_the_whole_command() {
	let _logging = logging::init_test();

	let dir = WorkDir::new();
	let journal = Journal::open(dir.file("event.log").path(), dir.file("perf.log").path(), false);
	let shell = Shell::new()
		.unwrap();
	let pid_file = dir.file("sleep.pid");

	// the sleep is a grandchild of ours, not the shell itself
	let command = format!("sleep 30 & echo $! > {}; wait; echo done", pid_file.path_str());

	let sender = thread::spawn(|| {
		thread::sleep(Duration::from_millis(500));
		signal_hook::low_level::raise(SIGTERM)
			.unwrap();
	});

	let start = Instant::now();
	let err = shell.run(&journal, &command)
		.unwrap_err();
	let elapsed = start.elapsed();
	sender.join()
		.unwrap();

	assert!(elapsed < Duration::from_secs(10), "took {:?}", elapsed);
	assert!(err.to_string().contains("killed"), "unexpected error: {}", err);
	assert_that!(&shell.terminated(), eq(true));

	// nothing left running
	let pid = pid_file.read();
	let pid = pid.trim();
	thread::sleep(Duration::from_millis(200));
	assert!(is_dead(pid), "sleep {} survived", pid);

	let events = dir.file("event.log").read();
	assert!(!events.contains("\ndone\n"), "events:\n{}", events);
}
