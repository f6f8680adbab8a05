//! Transport layer
//!
//! The TCP connection endpoint shared by both sides, the termination
//! marker, and per-connection session state.

pub mod endpoint;
pub mod marker;
pub mod session;

pub use endpoint::Connection;
pub use marker::{EOF_MARKER, MARKER_LEN, TrailingHold, is_marker};
pub use session::TransferSession;
