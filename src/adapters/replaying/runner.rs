//! Replaying adapter for the `CommandRunner` port.

use std::path::Path;
use std::sync::Mutex;

use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{CommandOutput, CommandRunner, RunError};

/// Replays recorded runner calls from a cassette.
///
/// Calls are served in recorded order; the directory and arguments of the
/// live call are not compared against the recording.
pub struct ReplayingCommandRunner {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingCommandRunner {
    /// Creates a new replaying runner from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

/// Extracts a `Result` from a cassette output recorded as `{"ok": ..}` / `{"err": ..}`.
///
/// # Panics
///
/// Panics if the recorded output does not deserialize, which means the
/// cassette was not produced by the recording adapter.
fn extract_result(output: &serde_json::Value, context: &str) -> Result<CommandOutput, RunError> {
    if let Some(err) = output.get("err") {
        let err: RunError = serde_json::from_value(err.clone())
            .unwrap_or_else(|e| panic!("{context}: malformed recorded error: {e}"));
        return Err(err);
    }
    let value = output.get("ok").unwrap_or(output);
    Ok(serde_json::from_value(value.clone())
        .unwrap_or_else(|e| panic!("{context}: malformed recorded output: {e}")))
}

impl CommandRunner for ReplayingCommandRunner {
    fn run(&self, _dir: &Path, _args: &[&str]) -> Result<CommandOutput, RunError> {
        let interaction =
            self.replayer.lock().expect("replayer lock poisoned").next_interaction("git", "run");
        extract_result(&interaction.output, "git::run")
    }
}
