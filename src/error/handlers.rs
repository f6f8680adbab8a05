//! Error handlers
//!
//! Classifies errors by how far they reach and turns them into the status
//! lines observers see.

use std::path::Path;

use crate::error::types::{ReceiveError, SendError};
use crate::progress::Status;

/// Whether a receiver error ends the process rather than one connection.
pub fn is_fatal(err: &ReceiveError) -> bool {
    matches!(
        err,
        ReceiveError::Bind { .. } | ReceiveError::Accept(_) | ReceiveError::ScanDestination { .. }
    )
}

/// Status line for a failed file on the sender side.
pub fn status_for_send(name: &str, err: &SendError) -> Status {
    match err {
        SendError::OpenSource { .. } => Status::OpenFailed(name.to_string()),
        SendError::ReadSource { .. }
        | SendError::Stream { .. }
        | SendError::BatchInProgress
        | SendError::Spawn(_) => Status::TransferFailed(name.to_string()),
    }
}

/// Status line for a failed connection on the receiver side.
pub fn status_for_receive(err: &ReceiveError) -> Status {
    match err {
        ReceiveError::CreateDestination { path, .. } => Status::DestinationFailed(path.clone()),
        ReceiveError::WriteDestination { path, .. } | ReceiveError::Stream { path, .. } => {
            Status::TransferFailed(display_name(path))
        }
        ReceiveError::Bind { .. } | ReceiveError::Accept(_) | ReceiveError::ScanDestination { .. } => {
            Status::TransferFailed("receiver".to_string())
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransferError;
    use std::io;
    use std::path::PathBuf;

    fn io_err() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "denied")
    }

    #[test]
    fn test_fatal_taxonomy() {
        let bind = ReceiveError::Bind {
            addr: "0.0.0.0:8080".parse().unwrap(),
            source: io_err(),
        };
        let create = ReceiveError::CreateDestination {
            path: PathBuf::from("out/received_file_1.mp4"),
            source: io_err(),
        };
        assert!(is_fatal(&bind));
        assert!(is_fatal(&ReceiveError::Accept(io_err())));
        assert!(!is_fatal(&create));
    }

    #[test]
    fn test_send_statuses() {
        let open = SendError::OpenSource {
            path: PathBuf::from("src/a.mp4"),
            source: io_err(),
        };
        let stream = SendError::Stream {
            name: "a.mp4".into(),
            source: TransferError::IdleTimeout("127.0.0.1:8080".parse().unwrap()),
        };
        assert_eq!(status_for_send("a.mp4", &open), Status::OpenFailed("a.mp4".into()));
        assert_eq!(
            status_for_send("a.mp4", &stream),
            Status::TransferFailed("a.mp4".into())
        );
    }

    #[test]
    fn test_receive_statuses() {
        let path = PathBuf::from("out/received_file_3.mp4");
        let create = ReceiveError::CreateDestination {
            path: path.clone(),
            source: io_err(),
        };
        let write = ReceiveError::WriteDestination {
            path,
            source: io_err(),
        };
        assert_eq!(
            status_for_receive(&create),
            Status::DestinationFailed(PathBuf::from("out/received_file_3.mp4"))
        );
        assert_eq!(
            status_for_receive(&write),
            Status::TransferFailed("received_file_3.mp4".into())
        );
    }
}
