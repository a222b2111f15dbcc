//! Probe configuration from the environment or a YAML fragment.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::adapters::live::LiveCommandRunner;

/// Binary used when nothing else is configured.
pub const DEFAULT_PROGRAM: &str = "git";

/// Environment variable naming the version-control binary.
pub const ENV_PROGRAM: &str = "REPOPROBE_GIT";
/// Environment variable holding the per-command timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "REPOPROBE_TIMEOUT_MS";
/// Environment variable naming a cassette file to record into.
pub const ENV_RECORD: &str = "REPOPROBE_RECORD";

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The timeout was not a whole number of milliseconds.
    #[error("REPOPROBE_TIMEOUT_MS must be a whole number of milliseconds, got {0:?}")]
    InvalidTimeout(String),
    /// The YAML fragment did not parse.
    #[error("invalid probe config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// How a [`RepoProbe`](crate::RepoProbe) runs commands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Binary name or path.
    pub program: String,
    /// Per-command deadline in milliseconds; `None` waits indefinitely.
    pub timeout_ms: Option<u64>,
    /// Cassette path to record every call into.
    pub record: Option<PathBuf>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self { program: DEFAULT_PROGRAM.to_string(), timeout_ms: None, record: None }
    }
}

impl ProbeConfig {
    /// Reads `REPOPROBE_GIT`, `REPOPROBE_TIMEOUT_MS` and `REPOPROBE_RECORD`.
    ///
    /// Unset or empty variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTimeout`] if the timeout does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), with an injectable variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTimeout`] if the timeout does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        if let Some(program) = var(ENV_PROGRAM) {
            config.program = program;
        }
        if let Some(raw) = var(ENV_TIMEOUT_MS) {
            let ms = raw.trim().parse().map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            config.timeout_ms = Some(ms);
        }
        config.record = var(ENV_RECORD).map(PathBuf::from);
        Ok(config)
    }

    /// Parses a YAML mapping with any of `program`, `timeout_ms`, `record`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] on malformed input or unknown keys.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// The configured deadline, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Builds the live runner this config describes. Recording is applied
    /// separately by [`RepoProbe::from_config`](crate::RepoProbe::from_config).
    #[must_use]
    pub fn runner(&self) -> LiveCommandRunner {
        let runner = LiveCommandRunner::with_program(&self.program);
        match self.timeout() {
            Some(limit) => runner.timeout(limit),
            None => runner,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_git_without_timeout() {
        let config = ProbeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ProbeConfig::default());
        assert_eq!(config.program, "git");
        assert_eq!(config.timeout(), None);
        assert_eq!(config.runner().program(), "git");
    }

    #[test]
    fn reads_all_variables() {
        let config = ProbeConfig::from_lookup(lookup(&[
            (ENV_PROGRAM, "/opt/git/bin/git"),
            (ENV_TIMEOUT_MS, "1500"),
            (ENV_RECORD, "/tmp/probe.cassette.yaml"),
        ]))
        .unwrap();

        assert_eq!(config.program, "/opt/git/bin/git");
        assert_eq!(config.timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.record, Some(PathBuf::from("/tmp/probe.cassette.yaml")));
    }

    #[test]
    fn empty_values_are_unset() {
        let config =
            ProbeConfig::from_lookup(lookup(&[(ENV_PROGRAM, ""), (ENV_TIMEOUT_MS, "  ")])).unwrap();
        assert_eq!(config, ProbeConfig::default());
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let err = ProbeConfig::from_lookup(lookup(&[(ENV_TIMEOUT_MS, "5s")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(ref raw) if raw == "5s"));
        assert!(err.to_string().contains(ENV_TIMEOUT_MS));
    }

    #[test]
    fn parses_partial_yaml() {
        let config = ProbeConfig::from_yaml_str("timeout_ms: 250\n").unwrap();
        assert_eq!(config.program, "git");
        assert_eq!(config.timeout_ms, Some(250));
    }

    #[test]
    fn yaml_rejects_unknown_keys() {
        assert!(ProbeConfig::from_yaml_str("binary: git\n").is_err());
    }
}
