//! Status vocabulary
//!
//! The short status lines shown to whoever observes a transfer. These are
//! the only user-facing error signal; callers never receive error codes.

use std::fmt;
use std::path::PathBuf;

/// A status transition published through the progress sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Receiver is idle and blocked in accept.
    WaitingForSender,
    /// Receiver accepted a connection and is about to sink it.
    Receiving,
    /// Batch requested with an empty selection queue.
    NothingSelected,
    /// Batch started.
    Transferring,
    /// Every queued file was streamed.
    AllTransferred,
    /// Source file could not be opened; the file was skipped.
    OpenFailed(String),
    /// Connect or stream failure on the named file or destination.
    TransferFailed(String),
    /// Receiver could not create its destination file.
    DestinationFailed(PathBuf),
    /// Batch finished with at least one failed file.
    BatchIncomplete { failed: usize, total: usize },
}

impl Status {
    /// Whether this status reports a failure of some kind.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Status::OpenFailed(_)
                | Status::TransferFailed(_)
                | Status::DestinationFailed(_)
                | Status::BatchIncomplete { .. }
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::WaitingForSender => write!(f, "Waiting for sender to send files..."),
            Status::Receiving => write!(f, "Receiving file..."),
            Status::NothingSelected => write!(f, "No files selected!"),
            Status::Transferring => write!(f, "Transferring files..."),
            Status::AllTransferred => write!(f, "All files transferred successfully!"),
            Status::OpenFailed(name) => write!(f, "Failed to open file {name}"),
            Status::TransferFailed(name) => write!(f, "Transfer failed for {name}"),
            Status::DestinationFailed(path) => {
                write!(f, "Failed to create file {}", path.display())
            }
            Status::BatchIncomplete { failed, total } => {
                write!(f, "Transfer failed: {failed} of {total} files failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(
            Status::WaitingForSender.to_string(),
            "Waiting for sender to send files..."
        );
        assert_eq!(Status::NothingSelected.to_string(), "No files selected!");
        assert_eq!(
            Status::TransferFailed("a.mp4".into()).to_string(),
            "Transfer failed for a.mp4"
        );
        assert_eq!(
            Status::BatchIncomplete { failed: 1, total: 3 }.to_string(),
            "Transfer failed: 1 of 3 files failed"
        );
    }

    #[test]
    fn test_failure_classification() {
        assert!(!Status::AllTransferred.is_failure());
        assert!(!Status::Receiving.is_failure());
        assert!(Status::OpenFailed("x".into()).is_failure());
        assert!(Status::DestinationFailed(PathBuf::from("/nope")).is_failure());
    }
}
