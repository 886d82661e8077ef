
use std::io::Read;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::{debug, info, warn};

use crate::journal::Journal;


pub struct Shell {
	sigterm: Arc<AtomicBool>
}

impl Shell {

	pub fn new() -> Result<Self> {

		// install SIGTERM and SIGINT hooks, so we can pass them along to whatever is running
		let sigterm = Arc::new(AtomicBool::new(false));
		for signal in [SIGTERM, SIGINT] {
			signal_hook::flag::register(signal, sigterm.clone())
				.context(format!("Failed to install handler for signal {}", signal))?;
		}

		Ok(Self {
			sigterm
		})
	}

	/// True once SIGTERM (or SIGINT) has arrived. Stays true.
	pub fn terminated(&self) -> bool {
		self.sigterm.load(Ordering::Relaxed)
	}

	/// Runs a command line with `sh -c` and waits for it to finish.
	/// The command's stdout and stderr are copied into the journal.
	pub fn run(&self, journal: &Journal, command: impl AsRef<str>) -> Result<()> {

		let command = command.as_ref();
		journal.info("launch_shell_script", command);

		// NOTE: the topaz commands need a shell, they depend on glob expansion
		// the shell leads its own process group, so a signal reaches everything it started
		let mut process = Command::new("sh")
			.arg("-c")
			.arg(command)
			.process_group(0)
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.spawn()
			.context(format!("Failed to launch command: {}", command))?;
		debug!("launched pid {}", process.id());

		// drain the pipes on other threads, or a chatty command could block on a full pipe
		let stdout = process.stdout.take()
			.map(drain);
		let stderr = process.stderr.take()
			.map(drain);

		// wait for it to finish
		let mut forwarded = false;
		let exit = loop {

			let exit = process.try_wait()
				.context("Failed to check status of command, abandoning it")?;
			if let Some(exit) = exit {
				break exit;
			}

			// command is still running: if sigterm was requested, forward it to the whole group once
			if self.terminated() && !forwarded {
				info!("SIGTERM: forwarding to command");
				let status = Command::new("kill")
					.arg("-TERM")
					.arg("--")
					.arg(format!("-{}", process.id()))
					.status()
					.context("Failed to forward SIGTERM, abandoning the command")?;
				if !status.success() {
					warn!("Failed to forward SIGTERM to process group {}", process.id());
				}
				forwarded = true;
			}

			// wait a bit and then check again
			thread::sleep(Duration::from_millis(100));
		};

		for output in [stdout, stderr].into_iter().flatten() {
			let output = output.join()
				.map_err(|_| anyhow!("Failed to collect command output"))?;
			if !output.is_empty() {
				journal.info("shell output", format!("\n{}", output));
			}
		}

		if exit.success() {
			Ok(())
		} else if let Some(code) = exit.code() {
			bail!("command exited with code {}: {}", code, command);
		} else {
			bail!("command was killed: {}", command);
		}
	}
}


fn drain(mut stream: impl Read + Send + 'static) -> JoinHandle<String> {
	thread::spawn(move || {
		let mut buf = Vec::<u8>::new();
		// a read error just truncates the captured output
		let _ = stream.read_to_end(&mut buf);
		String::from_utf8_lossy(&buf).into_owned()
	})
}
