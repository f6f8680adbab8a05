//! Module `listener`
//!
//! Binds the receiver port and runs the strictly sequential accept loop:
//! one connection is accepted and fully sunk before the next is accepted.
//! Bind and accept failures are fatal; everything that goes wrong inside
//! one connection is reported and the loop carries on.

use log::{error, info};
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crate::error::{ReceiveError, is_fatal, status_for_receive};
use crate::progress::{ProgressEvent, ProgressSink, Status};
use crate::receiver::results::ReceivedFile;
use crate::receiver::sink::FileSink;
use crate::transport::Connection;

pub struct TransferListener {
    listener: TcpListener,
    local_addr: SocketAddr,
    sink: FileSink,
    progress: ProgressSink,
    accepted: Vec<PathBuf>,
}

impl TransferListener {
    pub fn bind(addr: SocketAddr, sink: FileSink, progress: ProgressSink) -> Result<Self, ReceiveError> {
        let listener =
            TcpListener::bind(addr).map_err(|source| ReceiveError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ReceiveError::Bind { addr, source })?;

        info!("Receiver bound to {}", local_addr);

        Ok(Self {
            listener,
            local_addr,
            sink,
            progress,
            accepted: Vec::new(),
        })
    }

    /// Address actually bound, useful when binding port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Destination files completed so far, in the order they were received.
    pub fn accepted(&self) -> &[PathBuf] {
        &self.accepted
    }

    /// Runs the accept loop until accepting fails.
    pub fn serve(mut self) -> Result<(), ReceiveError> {
        info!(
            "Waiting for senders on {} (writing into {})",
            self.local_addr,
            self.sink.namer().dir().display()
        );
        self.progress.status(Status::WaitingForSender);

        loop {
            self.serve_one()?;
        }
    }

    /// Runs [`serve`](Self::serve) on a dedicated worker thread.
    pub fn spawn(self) -> io::Result<JoinHandle<Result<(), ReceiveError>>> {
        thread::Builder::new()
            .name("receiver".to_string())
            .spawn(move || self.serve())
    }

    /// Accepts and sinks exactly one connection.
    ///
    /// Returns `Err` only for a fatal accept failure; a connection that
    /// could not be received yields `Ok(None)`.
    pub fn serve_one(&mut self) -> Result<Option<ReceivedFile>, ReceiveError> {
        let (stream, peer) = self.listener.accept().map_err(|e| {
            error!("Error accepting connection: {}", e);
            ReceiveError::Accept(e)
        })?;

        info!("Connection accepted from {}", peer);
        self.progress.status(Status::Receiving);

        let received = match Connection::accepted(stream, peer) {
            Ok(conn) => self.sink.receive(conn),
            Err(source) => Err(ReceiveError::Stream {
                path: self.sink.namer().dir().to_path_buf(),
                source,
            }),
        };

        let received = match received {
            Ok(file) => {
                self.accepted.push(file.path.clone());
                self.progress
                    .publish(ProgressEvent::FileReceived(file.path.clone()));
                Some(file)
            }
            Err(e) if is_fatal(&e) => return Err(e),
            Err(e) => {
                self.progress.status(status_for_receive(&e));
                None
            }
        };

        self.progress.status(Status::WaitingForSender);
        Ok(received)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receiver::naming::DestinationNamer;

    fn listener_in(dir: &std::path::Path) -> (TransferListener, crate::progress::ProgressFeed) {
        let (progress, feed) = ProgressSink::channel();
        let namer = DestinationNamer::new(dir, "received_file_", "mp4");
        let sink = FileSink::new(namer, 1024, progress.clone());
        let listener =
            TransferListener::bind("127.0.0.1:0".parse().unwrap(), sink, progress).unwrap();
        (listener, feed)
    }

    #[test]
    fn test_serve_one_records_accepted_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut listener, feed) = listener_in(dir.path());
        let addr = listener.local_addr();

        let sender = thread::spawn(move || {
            let mut conn = Connection::connect(addr, None).unwrap();
            conn.write_chunk(b"hello media").unwrap();
            conn.send_marker().unwrap();
            conn.close();
        });

        let received = listener.serve_one().unwrap().unwrap();
        sender.join().unwrap();

        assert_eq!(received.bytes, 11);
        assert_eq!(listener.accepted(), &[received.path.clone()]);

        let statuses: Vec<Status> = feed
            .try_iter()
            .filter_map(|e| match e {
                ProgressEvent::Status(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(statuses, vec![Status::Receiving, Status::WaitingForSender]);
    }

    #[test]
    fn test_bind_conflict_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (first, _feed) = listener_in(dir.path());

        let (progress, _feed2) = ProgressSink::channel();
        let sink = FileSink::new(DestinationNamer::new(dir.path(), "x_", "mp4"), 1024, progress.clone());
        let err = TransferListener::bind(first.local_addr(), sink, progress)
            .err()
            .unwrap();

        assert!(matches!(err, ReceiveError::Bind { .. }));
        assert!(is_fatal(&err));
    }
}
