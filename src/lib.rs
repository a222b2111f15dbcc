//! Repository provenance for release tooling.
//!
//! [`RepoProbe`] answers four questions about a git working directory: the
//! short head commit, whether the tree is clean, the current branch, and a
//! tag-relative summary such as `v1.2.0-3-g1a2b3c4-dirty`.
//!
//! ```no_run
//! use repoprobe::RepoProbe;
//!
//! let probe = RepoProbe::new(".");
//! match probe.summary() {
//!     Ok(summary) => println!("version {summary}"),
//!     Err(err) if err.is_no_commits() => println!("nothing committed yet"),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```
//!
//! The probe talks to git only through the [`CommandRunner`] port, so it
//! can also be driven by a recorded cassette or a scripted fake.

pub mod adapters;
pub mod cassette;
pub mod config;
pub mod error;
pub mod ports;
pub mod probe;
pub mod provenance;
pub mod types;

pub use config::{ConfigError, ProbeConfig};
pub use error::ProbeError;
pub use ports::{CommandOutput, CommandRunner, RunError};
pub use probe::RepoProbe;
pub use provenance::Provenance;
pub use types::{Anchor, Branch, Cleanliness, CommitId, Summary};
