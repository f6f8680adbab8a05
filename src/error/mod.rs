//! Error handling
//!
//! Defines error types and how each one surfaces to observers.

pub mod handlers;
pub mod types;

pub use handlers::{is_fatal, status_for_receive, status_for_send};
pub use types::*;
