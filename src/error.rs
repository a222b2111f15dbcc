//! Error taxonomy for repository queries.

use std::path::PathBuf;

use crate::ports::RunError;

/// Errors surfaced by [`RepoProbe`](crate::RepoProbe) queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// The binary could not run or exited non-zero.
    #[error(
        "`{command}` failed in {} ({}){}",
        dir.display(),
        describe_status(*status),
        describe_stderr(stderr)
    )]
    CommandFailed {
        /// The rendered command line.
        command: String,
        /// Working directory the command ran in.
        dir: PathBuf,
        /// Exit code; `None` if the process never ran or was killed by a signal.
        status: Option<i32>,
        /// Trimmed standard error, or the spawn failure reason.
        stderr: String,
    },
    /// The repository exists but has no commits yet.
    #[error("repository at {} has no commits yet", dir.display())]
    NoCommits {
        /// The repository directory.
        dir: PathBuf,
    },
    /// The command exceeded the configured deadline and was killed.
    #[error("`{command}` timed out after {timeout_ms}ms")]
    Timeout {
        /// The rendered command line.
        command: String,
        /// The deadline that expired, in milliseconds.
        timeout_ms: u64,
    },
    /// The command succeeded but printed something that could not be parsed.
    #[error("`{command}` printed unexpected output: {output:?}")]
    UnexpectedOutput {
        /// The rendered command line.
        command: String,
        /// The trimmed standard output.
        output: String,
    },
}

impl ProbeError {
    /// Maps a runner failure onto the probe taxonomy.
    ///
    /// A binary that cannot be spawned is reported as `CommandFailed` with no
    /// exit status.
    pub(crate) fn from_run(err: RunError, dir: PathBuf) -> Self {
        match err {
            RunError::Spawn { command, reason } => {
                Self::CommandFailed { command, dir, status: None, stderr: reason }
            }
            RunError::Timeout { command, timeout_ms } => Self::Timeout { command, timeout_ms },
        }
    }

    /// Returns `true` for [`ProbeError::NoCommits`].
    #[must_use]
    pub fn is_no_commits(&self) -> bool {
        matches!(self, Self::NoCommits { .. })
    }
}

fn describe_status(status: Option<i32>) -> String {
    status.map_or_else(|| "no exit status".to_string(), |code| format!("exit status {code}"))
}

fn describe_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}
