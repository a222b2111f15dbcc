//! Command runner port for invoking the version-control binary.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// The captured result of one finished child process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// The exit code, or `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// The captured standard output.
    pub stdout: String,
    /// The captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Builds a successful output with the given stdout.
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self { exit_code: Some(0), stdout: stdout.into(), stderr: String::new() }
    }

    /// Builds a failed output with the given exit code and stderr.
    #[must_use]
    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self { exit_code: Some(exit_code), stdout: String::new(), stderr: stderr.into() }
    }

    /// Returns `true` only when the process exited with status 0.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Failures that leave no exit status to inspect.
///
/// A non-zero exit is not a `RunError`; it comes back as a regular
/// [`CommandOutput`] for the caller to interpret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunError {
    /// The process could not be started or its output could not be collected.
    #[error("failed to run `{command}`: {reason}")]
    Spawn {
        /// The rendered command line.
        command: String,
        /// The underlying I/O error message.
        reason: String,
    },
    /// The process outlived its deadline and was killed.
    #[error("`{command}` timed out after {timeout_ms}ms")]
    Timeout {
        /// The rendered command line.
        command: String,
        /// The deadline that expired, in milliseconds.
        timeout_ms: u64,
    },
}

/// Runs version-control subcommands inside a working directory.
///
/// Abstracting process execution lets the probe be driven by a scripted
/// fake or a recorded cassette instead of a real binary.
pub trait CommandRunner: Send + Sync {
    /// Runs the binary with `args`, using `dir` as its working directory.
    ///
    /// # Errors
    ///
    /// Returns a [`RunError`] if the process cannot be spawned or exceeds
    /// its deadline.
    fn run(&self, dir: &Path, args: &[&str]) -> Result<CommandOutput, RunError>;

    /// The binary name used when rendering commands in error messages.
    fn program(&self) -> &str {
        "git"
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for std::sync::Arc<R> {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<CommandOutput, RunError> {
        (**self).run(dir, args)
    }

    fn program(&self) -> &str {
        (**self).program()
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for Box<R> {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<CommandOutput, RunError> {
        (**self).run(dir, args)
    }

    fn program(&self) -> &str {
        (**self).program()
    }
}

/// Renders a program and its arguments as a single command line for messages.
#[must_use]
pub fn render_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program).chain(args.iter().copied()).collect::<Vec<_>>().join(" ")
}
