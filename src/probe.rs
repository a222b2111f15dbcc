//! Repository introspection over a command runner.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::adapters::live::LiveCommandRunner;
use crate::adapters::recording::RecordingCommandRunner;
use crate::adapters::replaying::ReplayingCommandRunner;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::ports::runner::{render_command, CommandOutput, CommandRunner};
use crate::provenance::Provenance;
use crate::types::{Anchor, Branch, Cleanliness, CommitId, Summary};

/// Exits 1 without output when HEAD does not resolve.
const SHORT_HEAD: &[&str] = &["rev-parse", "--verify", "--quiet", "--short", "HEAD"];
const STATUS: &[&str] = &["status", "--porcelain", "--untracked-files=normal"];
const SYMBOLIC_HEAD: &[&str] = &["symbolic-ref", "--quiet", "--short", "HEAD"];
/// `--long` keeps exact matches in `<tag>-0-g<hash>` form so every tagged
/// result parses the same way.
const DESCRIBE: &[&str] = &["describe", "--tags", "--long", "--always"];

/// Answers commit, cleanliness, branch and summary queries for one directory.
///
/// Every query runs fresh commands; nothing is cached. The directory is
/// fixed at construction and never taken from the process working directory.
pub struct RepoProbe {
    dir: PathBuf,
    program: String,
    runner: Box<dyn CommandRunner>,
    /// Written to disk when the probe is dropped.
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

impl RepoProbe {
    /// Creates a probe that runs `git` from the search path with no deadline.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_runner(dir, LiveCommandRunner::new())
    }

    /// Creates a probe driven by a custom runner.
    ///
    /// Error messages name the binary reported by [`CommandRunner::program`].
    #[must_use]
    pub fn with_runner(dir: impl Into<PathBuf>, runner: impl CommandRunner + 'static) -> Self {
        Self {
            dir: dir.into(),
            program: runner.program().to_string(),
            runner: Box::new(runner),
            recorder: None,
        }
    }

    /// Creates a live probe from `config`.
    ///
    /// When `config.record` is set, every call is also recorded and the
    /// cassette is written there when the probe is dropped.
    #[must_use]
    pub fn from_config(dir: impl Into<PathBuf>, config: &ProbeConfig) -> Self {
        let live = config.runner();
        match &config.record {
            Some(path) => Self::recording(dir, live, path),
            None => Self::with_runner(dir, live),
        }
    }

    /// Creates a probe that records every call made through `runner`.
    ///
    /// The cassette is stamped with the head commit at the time of creation,
    /// or `"unknown"` when it does not resolve, and is written to `cassette`
    /// when the probe is dropped.
    #[must_use]
    pub fn recording(
        dir: impl Into<PathBuf>,
        runner: impl CommandRunner + 'static,
        cassette: &Path,
    ) -> Self {
        let dir = dir.into();
        let head = stamp_commit(&runner, &dir);
        let recorder =
            Arc::new(Mutex::new(CassetteRecorder::new(cassette, "repoprobe-session", head)));
        let runner = RecordingCommandRunner::new(Box::new(runner), Arc::clone(&recorder));
        let mut probe = Self::with_runner(dir, runner);
        probe.recorder = Some(recorder);
        probe
    }

    /// Creates a probe that answers from a recorded cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(dir: impl Into<PathBuf>, cassette: &Path) -> Result<Self, String> {
        let replayer = CassetteReplayer::load(cassette)?;
        Ok(Self::with_runner(dir, ReplayingCommandRunner::new(replayer)))
    }

    /// The bound working directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn invoke(&self, args: &[&str]) -> Result<CommandOutput, ProbeError> {
        self.runner.run(&self.dir, args).map_err(|err| ProbeError::from_run(err, self.dir.clone()))
    }

    fn failed(&self, args: &[&str], output: &CommandOutput) -> ProbeError {
        ProbeError::CommandFailed {
            command: render_command(&self.program, args),
            dir: self.dir.clone(),
            status: output.exit_code,
            stderr: output.stderr.trim().to_string(),
        }
    }

    fn unexpected(&self, args: &[&str], output: &str) -> ProbeError {
        ProbeError::UnexpectedOutput {
            command: render_command(&self.program, args),
            output: output.to_string(),
        }
    }

    /// Runs a subcommand in the bound directory and returns its stdout with
    /// trailing whitespace removed.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::CommandFailed`] on a non-zero exit or when the
    /// binary cannot be started, and [`ProbeError::Timeout`] when the runner's
    /// deadline expires.
    pub fn run_command(&self, args: &[&str]) -> Result<String, ProbeError> {
        let output = self.invoke(args)?;
        if !output.is_success() {
            return Err(self.failed(args, &output));
        }
        Ok(output.stdout.trim_end().to_string())
    }

    /// Resolves the abbreviated hash of the head commit.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::NoCommits`] for a repository without history,
    /// or any error from [`run_command`](Self::run_command).
    pub fn commit(&self) -> Result<CommitId, ProbeError> {
        let output = self.invoke(SHORT_HEAD)?;
        if output.is_success() {
            let raw = output.stdout.trim();
            return CommitId::parse(raw).ok_or_else(|| self.unexpected(SHORT_HEAD, raw));
        }

        let silent = output.stdout.trim().is_empty() && output.stderr.trim().is_empty();
        if output.exit_code == Some(1) && silent {
            return Err(ProbeError::NoCommits { dir: self.dir.clone() });
        }
        Err(self.failed(SHORT_HEAD, &output))
    }

    /// Reports whether anything differs from the head commit, untracked
    /// files included.
    ///
    /// # Errors
    ///
    /// Returns any error from [`run_command`](Self::run_command).
    pub fn state(&self) -> Result<Cleanliness, ProbeError> {
        let porcelain = self.run_command(STATUS)?;
        Ok(if porcelain.trim().is_empty() { Cleanliness::Clean } else { Cleanliness::Dirty })
    }

    /// Returns the checked-out branch, or [`Branch::Detached`].
    ///
    /// Never fails: anything that prevents resolving a symbolic name is
    /// reported as detached.
    #[must_use]
    pub fn branch(&self) -> Branch {
        match self.run_command(SYMBOLIC_HEAD) {
            Ok(name) if !name.trim().is_empty() => Branch::Named(name.trim().to_string()),
            Ok(_) => Branch::Detached,
            Err(err) => {
                tracing::debug!(dir = %self.dir.display(), %err, "no symbolic HEAD, reporting detached");
                Branch::Detached
            }
        }
    }

    /// Describes the head relative to the nearest reachable tag.
    ///
    /// Tag selection is whatever `git describe --tags` picks. The dirty
    /// suffix comes from [`state`](Self::state), checked after the tag lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::NoCommits`] for a repository without history,
    /// [`ProbeError::UnexpectedOutput`] if describe output does not parse,
    /// or any error from [`run_command`](Self::run_command).
    pub fn summary(&self) -> Result<Summary, ProbeError> {
        self.commit()?;
        let described = self.run_command(DESCRIBE)?;
        let anchor = Anchor::parse_describe(described.trim())
            .ok_or_else(|| self.unexpected(DESCRIBE, &described))?;
        let state = self.state()?;
        Ok(Summary { anchor, state })
    }

    /// Runs all four queries and stamps the result with the current time.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`commit`](Self::commit),
    /// [`state`](Self::state) or [`summary`](Self::summary).
    pub fn provenance(&self) -> Result<Provenance, ProbeError> {
        let commit = self.commit()?;
        let state = self.state()?;
        let branch = self.branch();
        let summary = self.summary()?;
        Ok(Provenance { commit, state, branch, summary, probed_at: Utc::now() })
    }
}

/// Best-effort head commit for a cassette header. Runs outside the recording.
fn stamp_commit(runner: &dyn CommandRunner, dir: &Path) -> String {
    runner
        .run(dir, SHORT_HEAD)
        .ok()
        .filter(CommandOutput::is_success)
        .and_then(|output| CommitId::parse(output.stdout.trim()))
        .map_or_else(|| "unknown".to_string(), |id| id.as_str().to_string())
}

impl Drop for RepoProbe {
    fn drop(&mut self) {
        let Some(recorder) = self.recorder.take() else { return };
        let Ok(guard) = recorder.lock() else {
            tracing::warn!("cassette recorder lock poisoned, recording discarded");
            return;
        };
        match guard.write() {
            Ok(path) => {
                tracing::debug!(path = %path.display(), interactions = guard.len(), "cassette written");
            }
            Err(err) => tracing::warn!(path = %guard.path().display(), %err, "failed to write cassette"),
        }
    }
}
