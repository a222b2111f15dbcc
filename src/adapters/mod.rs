//! Adapter implementations of the port traits.
//!
//! - `live`: spawns real processes
//! - `recording`: delegates to another runner and records to a cassette
//! - `replaying`: answers from a recorded cassette
//! - `scripted`: answers from an in-memory script

pub mod live;
pub mod recording;
pub mod replaying;
pub mod scripted;

pub use live::LiveCommandRunner;
pub use recording::RecordingCommandRunner;
pub use replaying::ReplayingCommandRunner;
pub use scripted::ScriptedCommandRunner;
