pub mod config;
pub mod error;
pub mod progress;
pub mod receiver;
pub mod sender;
pub mod transport;
pub mod utils;

pub use config::AppConfig;
pub use progress::{ProgressEvent, ProgressFeed, ProgressSink, ProgressState, Status};
pub use receiver::{FileSink, TransferListener};
pub use sender::{BatchRunner, SelectionQueue, TransferClient};
