//! Replays recorded interactions from a cassette.

use std::collections::VecDeque;
use std::path::Path;

use super::format::{Cassette, Interaction};

/// Serves a cassette's interactions strictly in recorded order.
pub struct CassetteReplayer {
    pending: VecDeque<Interaction>,
    total: usize,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut pending: VecDeque<Interaction> = cassette.interactions.iter().cloned().collect();
        pending.make_contiguous().sort_by_key(|i| i.seq);
        Self { total: pending.len(), pending }
    }

    /// Read and parse a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        let cassette: Cassette = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
        Ok(Self::new(&cassette))
    }

    /// Count of interactions not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Take the next interaction, which must have been recorded for `port`
    /// and `method`.
    ///
    /// # Panics
    ///
    /// Panics when the cassette is used up, or when the next recorded
    /// interaction belongs to a different port or method.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Interaction {
        let Some(next) = self.pending.pop_front() else {
            assert!(
                self.total > 0,
                "Cassette exhausted: no interactions recorded, {port}::{method} requested"
            );
            panic!(
                "Cassette exhausted: all {} interactions consumed, {port}::{method} requested",
                self.total
            );
        };
        assert!(
            next.port == port && next.method == method,
            "Cassette out of order: {port}::{method} requested but seq={} is {}::{}",
            next.seq,
            next.port,
            next.method,
        );
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn interaction(seq: u64, method: &str, output: serde_json::Value) -> Interaction {
        Interaction { seq, port: "git".into(), method: method.into(), input: json!({}), output }
    }

    fn make_cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette { name: "test".into(), recorded_at: Utc::now(), commit: "abc".into(), interactions }
    }

    #[test]
    fn serves_interactions_by_sequence_number() {
        let cassette = make_cassette(vec![
            interaction(1, "run", json!({"n": 2})),
            interaction(0, "run", json!({"n": 1})),
        ]);

        let mut replayer = CassetteReplayer::new(&cassette);
        assert_eq!(replayer.remaining(), 2);

        assert_eq!(replayer.next_interaction("git", "run").output, json!({"n": 1}));
        assert_eq!(replayer.next_interaction("git", "run").seq, 1);
        assert_eq!(replayer.remaining(), 0);
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.yaml");
        let yaml = serde_yaml::to_string(&make_cassette(vec![interaction(0, "run", json!(1))]))
            .unwrap();
        std::fs::write(&path, yaml).unwrap();

        let mut replayer = CassetteReplayer::load(&path).unwrap();
        assert_eq!(replayer.next_interaction("git", "run").output, json!(1));
    }

    #[test]
    fn load_reports_path_on_failure() {
        let err = CassetteReplayer::load(Path::new("/definitely/missing.yaml")).err().unwrap();
        assert!(err.contains("/definitely/missing.yaml"));
    }

    #[test]
    #[should_panic(expected = "all 1 interactions consumed")]
    fn exhausted_replayer_panics_with_descriptive_message() {
        let cassette = make_cassette(vec![interaction(0, "run", json!({}))]);
        let mut replayer = CassetteReplayer::new(&cassette);
        let _ = replayer.next_interaction("git", "run");
        let _ = replayer.next_interaction("git", "run");
    }

    #[test]
    #[should_panic(expected = "no interactions recorded")]
    fn empty_cassette_panics() {
        let mut replayer = CassetteReplayer::new(&make_cassette(vec![]));
        let _ = replayer.next_interaction("git", "run");
    }

    #[test]
    #[should_panic(expected = "Cassette out of order")]
    fn mismatched_method_panics() {
        let cassette = make_cassette(vec![interaction(0, "other", json!({}))]);
        let mut replayer = CassetteReplayer::new(&cassette);
        let _ = replayer.next_interaction("git", "run");
    }
}
