//! Snapshot of every query, for stamping into build artifacts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{Branch, Cleanliness, CommitId, Summary};

/// All four query results taken back to back.
///
/// The queries are separate commands, so a concurrent writer can make the
/// fields disagree with each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    /// Abbreviated head commit.
    pub commit: CommitId,
    /// Working tree state.
    pub state: Cleanliness,
    /// Branch name, or `HEAD` when detached.
    pub branch: Branch,
    /// Tag-relative descriptor.
    pub summary: Summary,
    /// When the snapshot was taken.
    pub probed_at: DateTime<Utc>,
}

impl Provenance {
    /// Name/value pairs for a dotenv file or `cargo:rustc-env` lines.
    #[must_use]
    pub fn env_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("REPO_COMMIT", self.commit.to_string()),
            ("REPO_STATE", self.state.to_string()),
            ("REPO_BRANCH", self.branch.to_string()),
            ("REPO_SUMMARY", self.summary.to_string()),
            ("REPO_PROBED_AT", self.probed_at.to_rfc3339()),
        ]
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {}, {})", self.summary, self.branch, self.commit, self.state)
    }
}
