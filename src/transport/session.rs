//! Per-connection transfer bookkeeping.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// State of one connection's transfer, sender or receiver side.
///
/// The sender knows `total` up front from the file length; the receiver
/// never learns it, so it reports absolute byte counts instead.
#[derive(Debug, Clone)]
pub struct TransferSession {
    peer: SocketAddr,
    path: PathBuf,
    transferred: u64,
    total: Option<u64>,
}

impl TransferSession {
    pub fn new(peer: SocketAddr, path: PathBuf, total: Option<u64>) -> Self {
        Self {
            peer,
            path,
            transferred: 0,
            total,
        }
    }

    /// Adds `n` bytes and returns the running total.
    pub fn record(&mut self, n: usize) -> u64 {
        self.transferred += n as u64;
        self.transferred
    }

    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Fraction complete when the total is known. A zero-length file is
    /// complete from the start.
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(0) => Some(1.0),
            Some(total) => Some((self.transferred as f64 / total as f64).min(1.0)),
            None => None,
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "127.0.0.1:8080".parse().unwrap()
    }

    #[test]
    fn test_sender_fraction() {
        let mut session = TransferSession::new(peer(), PathBuf::from("a.mp4"), Some(2500));
        session.record(1024);
        session.record(1024);
        assert_eq!(session.fraction(), Some(2048.0 / 2500.0));
        session.record(452);
        assert_eq!(session.fraction(), Some(1.0));
        assert_eq!(session.transferred(), 2500);
    }

    #[test]
    fn test_zero_length_is_complete() {
        let session = TransferSession::new(peer(), PathBuf::from("empty.mp4"), Some(0));
        assert_eq!(session.fraction(), Some(1.0));
    }

    #[test]
    fn test_receiver_has_no_fraction() {
        let mut session = TransferSession::new(peer(), PathBuf::from("out.mp4"), None);
        assert_eq!(session.record(500), 500);
        assert_eq!(session.fraction(), None);
    }
}
