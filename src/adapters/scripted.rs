//! In-memory command runner with canned responses.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::ports::{CommandOutput, CommandRunner, RunError};

type Response = Result<CommandOutput, RunError>;

/// Answers calls from a script keyed by argument list.
///
/// Responses for the same arguments are served in the order they were
/// added; the last one repeats once the queue is down to it. Every call is
/// logged so tests can assert on what the probe asked for.
#[derive(Default)]
pub struct ScriptedCommandRunner {
    script: Mutex<HashMap<Vec<String>, VecDeque<Response>>>,
    calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
}

impl ScriptedCommandRunner {
    /// Creates a runner with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `args` with `output`.
    #[must_use]
    pub fn on(self, args: &[&str], output: CommandOutput) -> Self {
        self.push(args, Ok(output));
        self
    }

    /// Answer `args` with a runner failure.
    #[must_use]
    pub fn fails(self, args: &[&str], err: RunError) -> Self {
        self.push(args, Err(err));
        self
    }

    fn push(&self, args: &[&str], response: Response) {
        self.script
            .lock()
            .expect("script lock poisoned")
            .entry(owned(args))
            .or_default()
            .push_back(response);
    }

    /// Every call made so far, as `(dir, args)`.
    #[must_use]
    pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(ToString::to_string).collect()
}

impl CommandRunner for ScriptedCommandRunner {
    /// # Panics
    ///
    /// Panics when `args` has no scripted response.
    fn run(&self, dir: &Path, args: &[&str]) -> Result<CommandOutput, RunError> {
        let key = owned(args);
        self.calls.lock().expect("calls lock poisoned").push((dir.to_path_buf(), key.clone()));

        let mut script = self.script.lock().expect("script lock poisoned");
        let queue = script
            .get_mut(&key)
            .unwrap_or_else(|| panic!("no scripted response for args {key:?}"));
        if queue.len() > 1 {
            queue.pop_front().expect("queue is non-empty")
        } else {
            queue.front().cloned().expect("scripted queues are never empty")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_response_repeats() {
        let runner = ScriptedCommandRunner::new()
            .on(&["rev-parse"], CommandOutput::success("a"))
            .on(&["rev-parse"], CommandOutput::success("b"));
        let dir = Path::new("/srv/repo");

        assert_eq!(runner.run(dir, &["rev-parse"]).unwrap().stdout, "a");
        assert_eq!(runner.run(dir, &["rev-parse"]).unwrap().stdout, "b");
        assert_eq!(runner.run(dir, &["rev-parse"]).unwrap().stdout, "b");
    }

    #[test]
    fn logs_directory_and_arguments() {
        let runner = ScriptedCommandRunner::new().on(&["status"], CommandOutput::success(""));
        let _ = runner.run(Path::new("/srv/repo"), &["status"]);

        assert_eq!(runner.calls(), vec![(PathBuf::from("/srv/repo"), vec!["status".to_string()])]);
    }

    #[test]
    fn serves_scripted_failures() {
        let err = RunError::Spawn { command: "git tag".into(), reason: "gone".into() };
        let runner = ScriptedCommandRunner::new().fails(&["tag"], err.clone());
        assert_eq!(runner.run(Path::new("."), &["tag"]).unwrap_err(), err);
    }

    #[test]
    #[should_panic(expected = "no scripted response")]
    fn unscripted_call_panics() {
        let runner = ScriptedCommandRunner::new();
        let _ = runner.run(Path::new("."), &["describe"]);
    }
}
