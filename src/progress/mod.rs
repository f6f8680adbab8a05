//! Progress reporting
//!
//! Carries progress values and status lines from transfer workers to
//! whatever observes them, across threads.

pub mod sink;
pub mod state;
pub mod status;

pub use sink::{ProgressEvent, ProgressFeed, ProgressSink};
pub use state::ProgressState;
pub use status::Status;
