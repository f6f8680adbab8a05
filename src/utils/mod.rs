//! Utility functions
//!
//! Process-level helpers shared by both endpoints.

pub mod logging;
