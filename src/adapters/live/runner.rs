//! Live command runner that spawns the version-control binary.

use std::ffi::OsString;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::ports::runner::{render_command, CommandOutput, CommandRunner, RunError};

/// How often a child with a deadline is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Spawns a real process for every call.
///
/// The child always runs with `current_dir` set to the requested directory,
/// never the caller's working directory.
#[derive(Debug, Clone)]
pub struct LiveCommandRunner {
    program: String,
    timeout: Option<Duration>,
    envs: Vec<(OsString, OsString)>,
}

impl LiveCommandRunner {
    /// Creates a runner for `git` on the search path, with no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Creates a runner for a specific binary name or path.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self { program: program.into(), timeout: None, envs: Vec::new() }
    }

    /// Kill the child and fail with [`RunError::Timeout`] once `timeout` elapses.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set an extra environment variable for every child.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// The binary this runner spawns.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, dir: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .current_dir(dir)
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn wait_with_deadline(
        mut child: Child,
        limit: Duration,
        rendered: &str,
    ) -> Result<CommandOutput, RunError> {
        let spawn_err = |e: std::io::Error| RunError::Spawn {
            command: rendered.to_string(),
            reason: e.to_string(),
        };

        // Drain both pipes concurrently so a chatty child cannot block on a full pipe.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(command = rendered, %err, "lost track of child, killing it");
                    abandon(&mut child);
                    return Err(spawn_err(err));
                }
            }
            if started.elapsed() >= limit {
                tracing::warn!(command = rendered, ?limit, "killing command after timeout");
                abandon(&mut child);
                return Err(RunError::Timeout {
                    command: rendered.to_string(),
                    timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        Ok(CommandOutput {
            exit_code: status.code(),
            stdout: collect(stdout),
            stderr: collect(stderr),
        })
    }
}

impl Default for LiveCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Kills and reaps `child`; the drain threads finish once its pipes close.
fn abandon(child: &mut Child) {
    // The child may have exited between try_wait and kill.
    let _ = child.kill();
    let _ = child.wait();
}

fn drain(mut pipe: impl Read + Send + 'static) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    let bytes = handle.and_then(|h| h.join().ok()).unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl CommandRunner for LiveCommandRunner {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<CommandOutput, RunError> {
        let rendered = render_command(&self.program, args);
        let mut cmd = self.command(dir, args);
        let started = Instant::now();

        let result = match self.timeout {
            None => cmd.output().map(CommandOutput::from).map_err(|e| RunError::Spawn {
                command: rendered.clone(),
                reason: e.to_string(),
            }),
            Some(limit) => cmd
                .spawn()
                .map_err(|e| RunError::Spawn { command: rendered.clone(), reason: e.to_string() })
                .and_then(|child| Self::wait_with_deadline(child, limit, &rendered)),
        };

        match &result {
            Ok(output) => tracing::debug!(
                command = %rendered,
                dir = %dir.display(),
                exit_code = ?output.exit_code,
                elapsed = ?started.elapsed(),
                "command finished"
            ),
            Err(err) => {
                tracing::debug!(command = %rendered, dir = %dir.display(), %err, "command did not run");
            }
        }
        result
    }

    fn program(&self) -> &str {
        &self.program
    }
}
