//! Throwaway git repositories for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use repoprobe::adapters::LiveCommandRunner;
use repoprobe::RepoProbe;
use tempfile::TempDir;

/// A git binary isolated from user and system config, with a fixed identity.
pub fn isolated_git(repo: &Path, home: &Path) -> LiveCommandRunner {
    let ceiling = repo.parent().unwrap_or(repo).to_path_buf();
    LiveCommandRunner::new()
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GIT_CONFIG_GLOBAL", home.join("gitconfig"))
        .env("GIT_CEILING_DIRECTORIES", ceiling)
        .env("GIT_AUTHOR_NAME", "Probe Test")
        .env("GIT_AUTHOR_EMAIL", "probe@example.com")
        .env("GIT_COMMITTER_NAME", "Probe Test")
        .env("GIT_COMMITTER_EMAIL", "probe@example.com")
}

/// A temporary directory plus a probe bound to it.
pub struct TestRepo {
    dir: TempDir,
    home: TempDir,
    pub probe: RepoProbe,
}

impl TestRepo {
    /// An empty directory, not yet a repository.
    pub fn bare_dir() -> Self {
        let dir = tempfile::tempdir().expect("failed to create test dir");
        let home = tempfile::tempdir().expect("failed to create test home");
        let probe = RepoProbe::with_runner(dir.path(), isolated_git(dir.path(), home.path()));
        Self { dir, home, probe }
    }

    /// A freshly initialized repository on branch `main`, with no commits.
    pub fn init() -> Self {
        let repo = Self::bare_dir();
        repo.git(&["init", "-q"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The isolated runner, for building a second probe on the same repository.
    pub fn runner(&self) -> LiveCommandRunner {
        isolated_git(self.dir.path(), self.home.path())
    }

    pub fn git(&self, args: &[&str]) -> String {
        self.probe
            .run_command(args)
            .unwrap_or_else(|err| panic!("fixture command {args:?} failed: {err}"))
    }

    pub fn commit(&self, message: &str) {
        self.git(&["commit", "-q", "--allow-empty", "--no-gpg-sign", "--message", message]);
    }

    pub fn tag(&self, name: &str) {
        self.git(&["tag", name]);
    }

    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("failed to write test file");
        path
    }
}

/// Lowercase hex of a plausible abbreviated length.
pub fn is_short_hex(s: &str) -> bool {
    (4..=15).contains(&s.len()) && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
