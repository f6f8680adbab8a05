//! Sender endpoint
//!
//! Selection queue, per-file transfer client and the batch runner that
//! drives it.

pub mod batch;
pub mod catalog;
pub mod client;
pub mod queue;
pub mod results;

pub use batch::BatchRunner;
pub use catalog::list_media_files;
pub use client::{FileHandle, TransferClient};
pub use queue::SelectionQueue;
pub use results::{BatchReport, SentFile};
