//! Port traits defining external boundaries.
//!
//! The probe reaches the outside world only through [`CommandRunner`].
//! Implementations live in `src/adapters/`.

pub mod runner;

pub use runner::{CommandOutput, CommandRunner, RunError};
