//! Logging utilities
//!
//! Sets up the process-wide logger.

use env_logger::Env;

/// Setup logging for either endpoint.
///
/// Honours `RUST_LOG`; falls back to `info`.
pub fn setup_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_target(false)
        .init();
}
