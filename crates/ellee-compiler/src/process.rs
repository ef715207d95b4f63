//! Subprocess execution with an optional deadline.

use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{CompileError, Result};

/// How often a child is polled while a deadline is armed.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Run `command` to completion, capturing stdout and stderr.
///
/// Without a timeout this blocks until the child exits. With one, the child
/// is killed once the deadline passes and [`CompileError::Timeout`] is
/// returned.
pub fn run(mut command: Command, timeout: Option<Duration>) -> Result<Output> {
    let program = command.get_program().to_string_lossy().into_owned();
    let spawn_error = |source| CompileError::Spawn {
        program: program.clone(),
        source,
    };

    let Some(limit) = timeout else {
        return command.output().map_err(spawn_error);
    };

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(spawn_error)?;

    // Drain both pipes concurrently so a chatty child never blocks on a full pipe.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let started = Instant::now();
    let status = loop {
        match child.try_wait().map_err(spawn_error)? {
            Some(status) => break status,
            None if started.elapsed() >= limit => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!("{} killed after {:?}", program, limit);
                return Err(CompileError::Timeout {
                    program: program.clone(),
                    after: limit,
                });
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    };

    Ok(Output {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn collect(handle: JoinHandle<Vec<u8>>) -> Vec<u8> {
    handle.join().unwrap_or_default()
}
