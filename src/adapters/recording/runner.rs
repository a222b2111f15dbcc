//! Recording adapter for the `CommandRunner` port.

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{CommandOutput, CommandRunner, RunError};

/// Records runner calls while delegating to an inner implementation.
pub struct RecordingCommandRunner {
    inner: Box<dyn CommandRunner>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingCommandRunner {
    /// Creates a new recording runner wrapping the given implementation.
    pub fn new(inner: Box<dyn CommandRunner>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct RunInput<'a> {
    dir: String,
    args: &'a [&'a str],
}

impl CommandRunner for RecordingCommandRunner {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<CommandOutput, RunError> {
        let result = self.inner.run(dir, args);
        let input = RunInput { dir: dir.display().to_string(), args };
        record_result(&self.recorder, "git", "run", &input, &result);
        result
    }

    fn program(&self) -> &str {
        self.inner.program()
    }
}
