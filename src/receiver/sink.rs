//! Module `sink`
//!
//! Streams one accepted connection into a freshly named destination file.
//! Chunks are read until a standalone termination marker arrives or the
//! peer closes; every write is followed by an absolute byte-count progress
//! event because the sender never tells us the file size.

use log::{error, info, warn};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::error::ReceiveError;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::receiver::naming::DestinationNamer;
use crate::receiver::results::{ReceivedFile, Termination};
use crate::transport::{Connection, MARKER_LEN, TrailingHold, TransferSession, is_marker};

pub struct FileSink {
    namer: DestinationNamer,
    chunk_size: usize,
    idle_timeout: Option<Duration>,
    progress: ProgressSink,
}

impl FileSink {
    pub fn new(namer: DestinationNamer, chunk_size: usize, progress: ProgressSink) -> Self {
        Self {
            namer,
            chunk_size,
            idle_timeout: None,
            progress,
        }
    }

    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn namer(&self) -> &DestinationNamer {
        &self.namer
    }

    /// Receives one file from `conn`. The connection is always closed on
    /// return. A destination that cannot be created only fails this call.
    pub fn receive(&mut self, mut conn: Connection) -> Result<ReceivedFile, ReceiveError> {
        let path = self.namer.next_path();
        let peer = conn.peer();

        let mut file = match OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(source) => {
                error!("Failed to create file {}: {}", path.display(), source);
                conn.close();
                return Err(ReceiveError::CreateDestination { path, source });
            }
        };

        info!("Receiving from {} into {}", peer, path.display());

        let mut session = TransferSession::new(peer, path.clone(), None);
        let outcome = conn
            .set_idle_timeout(self.idle_timeout)
            .map_err(|source| ReceiveError::Stream {
                path: path.clone(),
                source,
            })
            .and_then(|_| self.pump(&mut conn, &mut file, &mut session));

        let outcome = outcome.and_then(|termination| {
            file.flush()
                .map_err(|source| ReceiveError::WriteDestination {
                    path: path.clone(),
                    source,
                })
                .map(|_| termination)
        });

        drop(file);
        conn.close();
        self.progress.publish(ProgressEvent::Reset);

        match outcome {
            Ok(termination) => {
                if termination == Termination::PeerClosed {
                    warn!("{} closed the connection without a termination marker", peer);
                }
                info!(
                    "File received: {} ({} bytes, {:?})",
                    path.display(),
                    session.transferred(),
                    termination
                );
                Ok(ReceivedFile {
                    path,
                    peer,
                    bytes: session.transferred(),
                    termination,
                })
            }
            Err(e) => {
                error!("Transfer from {} aborted: {}", peer, e);
                Err(e)
            }
        }
    }

    fn pump(
        &self,
        conn: &mut Connection,
        file: &mut File,
        session: &mut TransferSession,
    ) -> Result<Termination, ReceiveError> {
        let mut buf = vec![0u8; self.chunk_size];
        let mut ready = Vec::with_capacity(self.chunk_size + MARKER_LEN);
        let mut hold = TrailingHold::new();

        loop {
            let n = conn
                .read_chunk(&mut buf)
                .map_err(|source| ReceiveError::Stream {
                    path: session.path().to_path_buf(),
                    source,
                })?;

            if n == 0 {
                let (rest, stripped) = hold.finish();
                self.append(file, session, &rest)?;
                return Ok(if stripped {
                    Termination::TrailingMarker
                } else {
                    Termination::PeerClosed
                });
            }

            let chunk = &buf[..n];
            if is_marker(chunk) {
                let rest = hold.release();
                self.append(file, session, &rest)?;
                return Ok(Termination::Marker);
            }

            ready.clear();
            hold.push(chunk, &mut ready);
            self.append(file, session, &ready)?;
        }
    }

    fn append(
        &self,
        file: &mut File,
        session: &mut TransferSession,
        data: &[u8],
    ) -> Result<(), ReceiveError> {
        if data.is_empty() {
            return Ok(());
        }
        file.write_all(data)
            .map_err(|source| write_error(session.path(), source))?;
        let total = session.record(data.len());
        self.progress.bytes(total);
        Ok(())
    }
}

fn write_error(path: &Path, source: std::io::Error) -> ReceiveError {
    ReceiveError::WriteDestination {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    // Accepts one loopback connection whose peer writes `payload` and closes.
    fn connection_with(payload: Vec<u8>) -> Connection {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let writer = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.write_all(&payload).unwrap();
        });
        let (stream, peer) = listener.accept().unwrap();
        writer.join().unwrap();
        Connection::accepted(stream, peer).unwrap()
    }

    fn sink_in(dir: &Path) -> (FileSink, crate::progress::ProgressFeed) {
        let (progress, feed) = ProgressSink::channel();
        let namer = DestinationNamer::new(dir, "received_file_", "mp4");
        (FileSink::new(namer, 1024, progress), feed)
    }

    #[test]
    fn test_marker_in_last_read_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sink, feed) = sink_in(dir.path());

        let mut payload = vec![7u8; 600];
        payload.extend_from_slice(crate::transport::EOF_MARKER);
        let received = sink.receive(connection_with(payload)).unwrap();

        assert_ne!(received.termination, Termination::PeerClosed);
        assert_eq!(received.bytes, 600);
        assert_eq!(fs::read(&received.path).unwrap(), vec![7u8; 600]);

        let events: Vec<_> = feed.try_iter().collect();
        assert_eq!(events.last(), Some(&ProgressEvent::Reset));
        assert!(events.contains(&ProgressEvent::Bytes(600)));
    }

    #[test]
    fn test_each_connection_gets_a_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sink, _feed) = sink_in(dir.path());

        let first = sink.receive(connection_with(b"first".to_vec())).unwrap();
        let second = sink.receive(connection_with(b"second".to_vec())).unwrap();

        assert_eq!(first.path, dir.path().join("received_file_1.mp4"));
        assert_eq!(second.path, dir.path().join("received_file_2.mp4"));
        assert_eq!(first.termination, Termination::PeerClosed);
        assert_eq!(fs::read(&second.path).unwrap(), b"second");
    }

    #[test]
    fn test_uncreatable_destination_fails_the_connection() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let (mut sink, _feed) = sink_in(&blocker);

        let err = sink.receive(connection_with(b"data".to_vec())).unwrap_err();
        assert!(matches!(err, ReceiveError::CreateDestination { .. }));
        assert_eq!(sink.namer().peek(), 2);
    }
}
