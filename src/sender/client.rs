//! Module `client`
//!
//! Streams one file from the source directory to the receiver: open the
//! file, learn its length, dial the receiver, send fixed-size chunks while
//! publishing the fraction sent, then send the termination marker.

use log::{error, info};
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::SendError;
use crate::progress::ProgressSink;
use crate::sender::results::SentFile;
use crate::transport::{Connection, TransferSession};

/// An open source file together with the length measured before sending.
#[derive(Debug)]
pub struct FileHandle {
    path: PathBuf,
    len: u64,
    file: File,
}

impl FileHandle {
    pub fn open(path: PathBuf) -> Result<Self, SendError> {
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(source) => return Err(SendError::OpenSource { path, source }),
        };

        let len = match measure(&mut file) {
            Ok(len) => len,
            Err(source) => return Err(SendError::ReadSource { path, source }),
        };

        Ok(Self { path, len, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, SendError> {
        loop {
            match self.file.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(SendError::ReadSource {
                        path: self.path.clone(),
                        source,
                    });
                }
            }
        }
    }
}

/// Seeks to the end for the length and back to the start for reading.
fn measure(file: &mut File) -> std::io::Result<u64> {
    let len = file.seek(SeekFrom::End(0))?;
    file.seek(SeekFrom::Start(0))?;
    Ok(len)
}

/// Sends files to a fixed receiver address.
#[derive(Debug, Clone)]
pub struct TransferClient {
    source_dir: PathBuf,
    receiver: SocketAddr,
    chunk_size: usize,
    connect_timeout: Option<Duration>,
    idle_timeout: Option<Duration>,
    progress: ProgressSink,
}

impl TransferClient {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        receiver: SocketAddr,
        chunk_size: usize,
        progress: ProgressSink,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            receiver,
            chunk_size,
            connect_timeout: None,
            idle_timeout: None,
            progress,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn receiver(&self) -> SocketAddr {
        self.receiver
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Streams `name` (relative to the source directory) to the receiver.
    ///
    /// Nothing is dialled when the file cannot be opened. Any failure
    /// aborts this file only.
    pub fn send_file(&self, name: &str) -> Result<SentFile, SendError> {
        let mut handle = FileHandle::open(self.source_dir.join(name)).inspect_err(|e| {
            error!("{e}");
        })?;

        let stream_err = |source| SendError::Stream {
            name: name.to_string(),
            source,
        };

        let mut conn = Connection::connect(self.receiver, self.connect_timeout).map_err(stream_err)?;
        conn.set_idle_timeout(self.idle_timeout).map_err(stream_err)?;

        info!(
            "Sending {} ({} bytes) to {}",
            handle.path().display(),
            handle.len(),
            self.receiver
        );

        let mut session = TransferSession::new(
            self.receiver,
            handle.path().to_path_buf(),
            Some(handle.len()),
        );

        if handle.is_empty() {
            self.progress.fraction(1.0);
        }

        let result = self.stream(&mut handle, &mut conn, &mut session, name);
        conn.close();

        let chunks = result.inspect_err(|e| error!("{e}"))?;

        info!(
            "File sent: {} ({} bytes in {} chunks)",
            name,
            session.transferred(),
            chunks
        );

        Ok(SentFile {
            name: name.to_string(),
            bytes: session.transferred(),
            chunks,
        })
    }

    fn stream(
        &self,
        handle: &mut FileHandle,
        conn: &mut Connection,
        session: &mut TransferSession,
        name: &str,
    ) -> Result<usize, SendError> {
        let stream_err = |source| SendError::Stream {
            name: name.to_string(),
            source,
        };

        let mut buf = vec![0u8; self.chunk_size];
        let mut chunks = 0;

        loop {
            let n = handle.read_chunk(&mut buf)?;
            if n == 0 {
                break;
            }

            conn.write_chunk(&buf[..n]).map_err(stream_err)?;
            chunks += 1;
            session.record(n);

            if let Some(fraction) = session.fraction() {
                self.progress.fraction(fraction);
            }
        }

        conn.send_marker().map_err(stream_err)?;
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::net::TcpListener;

    #[test]
    fn test_file_handle_measures_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        fs::write(&path, vec![1u8; 2500]).unwrap();

        let mut handle = FileHandle::open(path).unwrap();
        assert_eq!(handle.len(), 2500);
        assert!(!handle.is_empty());

        // Reading starts from the beginning after measuring.
        let mut buf = [0u8; 1024];
        assert_eq!(handle.read_chunk(&mut buf).unwrap(), 1024);
    }

    #[test]
    fn test_missing_file_is_never_dialled() {
        let dir = tempfile::tempdir().unwrap();
        let watcher = TcpListener::bind("127.0.0.1:0").unwrap();
        watcher.set_nonblocking(true).unwrap();

        let client = TransferClient::new(
            dir.path(),
            watcher.local_addr().unwrap(),
            1024,
            ProgressSink::detached(),
        );
        let err = client.send_file("absent.mp4").unwrap_err();

        assert!(matches!(err, SendError::OpenSource { .. }));
        assert_eq!(
            watcher.accept().unwrap_err().kind(),
            std::io::ErrorKind::WouldBlock
        );
    }
}
