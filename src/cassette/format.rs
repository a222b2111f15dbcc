//! Cassette data structures for recording and replaying runner calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded call through a port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Sequence number (assigned automatically by the recorder).
    pub seq: u64,
    /// Port name, e.g. `"git"`.
    pub port: String,
    /// Method name invoked on the port.
    pub method: String,
    /// Input passed to the port.
    pub input: serde_json::Value,
    /// Output returned from the port, as `{"ok": ..}` or `{"err": ..}`.
    pub output: serde_json::Value,
}

/// An ordered sequence of recorded interactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name for this cassette.
    pub name: String,
    /// When this cassette was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Head commit of the recorded repository, or `"unknown"`.
    pub commit: String,
    /// Ordered list of interactions.
    pub interactions: Vec<Interaction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_hand_written_yaml() {
        let yaml = r#"
name: fixture
recorded_at: 2025-03-15T14:30:00Z
commit: 1a2b3c4
interactions:
  - seq: 0
    port: git
    method: run
    input:
      dir: /srv/repo
      args: [rev-parse, --verify, --quiet, --short, HEAD]
    output:
      ok:
        exit_code: 0
        stdout: "1a2b3c4\n"
        stderr: ""
"#;
        let cassette: Cassette = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(cassette.name, "fixture");
        assert_eq!(cassette.interactions.len(), 1);
        assert_eq!(cassette.interactions[0].input["args"][4], json!("HEAD"));
        assert_eq!(cassette.interactions[0].output["ok"]["exit_code"], json!(0));
    }
}
