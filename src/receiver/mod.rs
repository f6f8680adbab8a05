//! Receiver endpoint
//!
//! Accept loop, destination naming and the per-connection file sink.

pub mod listener;
pub mod naming;
pub mod results;
pub mod sink;

pub use listener::TransferListener;
pub use naming::DestinationNamer;
pub use results::{ReceivedFile, Termination};
pub use sink::FileSink;
