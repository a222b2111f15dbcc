//! Typed query results.
//!
//! Each value renders (and serializes) as the string form release tooling
//! embeds into artifacts.

use std::fmt;

use serde::{Serialize, Serializer};

/// An abbreviated commit hash: lowercase hex, at least 4 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitId(String);

impl CommitId {
    /// Shortest abbreviation git will produce.
    pub const MIN_LEN: usize = 4;
    /// Length of a full SHA-256 object name.
    pub const MAX_LEN: usize = 64;

    /// Validates `raw` as an abbreviated commit hash.
    ///
    /// Returns `None` unless `raw` is 4 to 64 lowercase hex digits.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let valid_len = (Self::MIN_LEN..=Self::MAX_LEN).contains(&raw.len());
        let valid_chars = raw.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        (valid_len && valid_chars).then(|| Self(raw.to_string()))
    }

    /// Returns the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether the working tree matches the head commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cleanliness {
    /// No modified, added, deleted or untracked files.
    Clean,
    /// At least one uncommitted change, including untracked files.
    Dirty,
}

impl Cleanliness {
    /// Returns `true` for [`Cleanliness::Dirty`].
    #[must_use]
    pub fn is_dirty(self) -> bool {
        self == Self::Dirty
    }
}

impl fmt::Display for Cleanliness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clean => "clean",
            Self::Dirty => "dirty",
        })
    }
}

/// The current checkout: a branch, or a detached head.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Branch {
    /// Checked out on the named branch.
    Named(String),
    /// Not on any branch. Renders as `HEAD`.
    Detached,
}

impl Branch {
    /// Sentinel rendered for a detached checkout.
    pub const DETACHED: &'static str = "HEAD";

    /// Returns the branch name, or `None` when detached.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Detached => None,
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or(Self::DETACHED))
    }
}

/// Where the summary is anchored relative to the nearest reachable tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// The head commit carries this tag.
    Tag(String),
    /// No tag is reachable; only the commit is known.
    Commit(CommitId),
    /// The head is `distance` commits past `tag`.
    Ahead {
        /// Nearest reachable tag.
        tag: String,
        /// Number of commits since `tag`.
        distance: u32,
        /// Abbreviated head commit.
        commit: CommitId,
    },
}

impl Anchor {
    /// Parses the output of `git describe --tags --long --always`.
    ///
    /// Long form is `<tag>-<distance>-g<hash>`; tag names may themselves
    /// contain dashes, so the output is split from the right. Output with no
    /// dash at all is a bare hash from `--always`.
    #[must_use]
    pub fn parse_describe(raw: &str) -> Option<Self> {
        if !raw.contains('-') {
            return CommitId::parse(raw).map(Self::Commit);
        }

        let mut parts = raw.rsplitn(3, '-');
        let hash = parts.next()?.strip_prefix('g')?;
        let distance: u32 = parts.next()?.parse().ok()?;
        let tag = parts.next().filter(|t| !t.is_empty())?;
        let commit = CommitId::parse(hash)?;

        Some(if distance == 0 {
            Self::Tag(tag.to_string())
        } else {
            Self::Ahead { tag: tag.to_string(), distance, commit }
        })
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => f.write_str(tag),
            Self::Commit(commit) => write!(f, "{commit}"),
            Self::Ahead { tag, distance, commit } => write!(f, "{tag}-{distance}-g{commit}"),
        }
    }
}

/// Tag-relative version descriptor, e.g. `v1.2.0-3-g1a2b3c4-dirty`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Summary {
    /// Position relative to the nearest tag.
    pub anchor: Anchor,
    /// Working tree state, rendered as a `-dirty` suffix when dirty.
    pub state: Cleanliness,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.anchor)?;
        if self.state.is_dirty() {
            f.write_str("-dirty")?;
        }
        Ok(())
    }
}

macro_rules! serialize_as_display {
    ($($ty:ty),*) => {$(
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
    )*};
}

serialize_as_display!(CommitId, Cleanliness, Branch, Anchor, Summary);
