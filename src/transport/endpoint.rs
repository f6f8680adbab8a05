//! Module `endpoint`
//!
//! Thin wrapper over one TCP stream, used the same way by both ends:
//! connect or adopt an accepted stream, read one chunk, write one chunk
//! completely, close.

use log::{debug, info, warn};
use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use crate::error::TransferError;
use crate::transport::marker::EOF_MARKER;

const MAX_RETRIES: usize = 3;

/// One open TCP connection.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Connection {
    /// Dials `addr`, optionally giving up after `timeout`.
    pub fn connect(addr: SocketAddr, timeout: Option<Duration>) -> Result<Self, TransferError> {
        let stream = match timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        }
        .map_err(|source| TransferError::Connect { addr, source })?;

        // Chunks and the marker go out as separate writes.
        stream.set_nodelay(true).map_err(TransferError::Socket)?;

        info!("Connected to receiver at {addr}");
        Ok(Self { stream, peer: addr })
    }

    /// Adopts a stream returned by `accept`.
    pub fn accepted(stream: TcpStream, peer: SocketAddr) -> Result<Self, TransferError> {
        stream.set_nonblocking(false).map_err(TransferError::Socket)?;
        Ok(Self { stream, peer })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Applies an idle timeout to reads and writes; `None` waits forever.
    pub fn set_idle_timeout(&self, timeout: Option<Duration>) -> Result<(), TransferError> {
        self.stream
            .set_read_timeout(timeout)
            .map_err(TransferError::Socket)?;
        self.stream
            .set_write_timeout(timeout)
            .map_err(TransferError::Socket)
    }

    /// Reads at most `buf.len()` bytes. `Ok(0)` means the peer closed.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, TransferError> {
        let mut retries = 0;
        loop {
            match self.stream.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if is_idle_timeout(&e) => {
                    return Err(TransferError::IdleTimeout(self.peer));
                }
                Err(e) if is_transient(&e) && retries < MAX_RETRIES => {
                    retries += 1;
                    warn!(
                        "Transient read error from {} (attempt {}/{}): {}. Retrying...",
                        self.peer, retries, MAX_RETRIES, e
                    );
                    backoff(retries);
                }
                Err(source) => {
                    return Err(TransferError::Read {
                        peer: self.peer,
                        source,
                    });
                }
            }
        }
    }

    /// Writes all of `data`, resuming after short writes. Fails only on a
    /// hard socket error.
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<(), TransferError> {
        let mut remaining = data;
        let mut retries = 0;

        while !remaining.is_empty() {
            match self.stream.write(remaining) {
                Ok(0) => {
                    return Err(TransferError::Write {
                        peer: self.peer,
                        source: io::Error::from(ErrorKind::WriteZero),
                    });
                }
                Ok(n) => {
                    if n < remaining.len() {
                        debug!("Short write to {}: {} of {} bytes", self.peer, n, remaining.len());
                    }
                    remaining = &remaining[n..];
                    retries = 0;
                }
                Err(e) if is_idle_timeout(&e) => {
                    return Err(TransferError::IdleTimeout(self.peer));
                }
                Err(e) if is_transient(&e) && retries < MAX_RETRIES => {
                    retries += 1;
                    warn!(
                        "Transient write error to {} (attempt {}/{}): {}. Retrying...",
                        self.peer, retries, MAX_RETRIES, e
                    );
                    backoff(retries);
                }
                Err(source) => {
                    return Err(TransferError::Write {
                        peer: self.peer,
                        source,
                    });
                }
            }
        }

        Ok(())
    }

    /// Sends the termination marker as its own write.
    pub fn send_marker(&mut self) -> Result<(), TransferError> {
        self.write_chunk(EOF_MARKER)?;
        self.stream.flush().map_err(|source| TransferError::Write {
            peer: self.peer,
            source,
        })
    }

    /// Shuts the connection down in both directions.
    pub fn close(self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            // Already reset by the peer; nothing left to release.
            debug!("Shutdown of connection to {} failed: {}", self.peer, e);
        }
    }
}

fn is_idle_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

fn is_transient(e: &io::Error) -> bool {
    e.kind() == ErrorKind::Interrupted
}

fn backoff(attempt: usize) {
    thread::sleep(Duration::from_millis(100 * attempt as u64));
}
