//! Error types
//!
//! Domain-specific error types for the socket layer, the receiver and the
//! sender.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Connection endpoint errors
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Failed to configure socket: {0}")]
    Socket(#[source] io::Error),

    #[error("Read from {peer} failed: {source}")]
    Read {
        peer: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Write to {peer} failed: {source}")]
    Write {
        peer: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Connection to {0} idle for too long")]
    IdleTimeout(SocketAddr),
}

/// Receiver errors
#[derive(Debug, Error)]
pub enum ReceiveError {
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Failed to accept connection: {0}")]
    Accept(#[source] io::Error),

    #[error("Failed to create file {}: {source}", path.display())]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    WriteDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Transfer into {} aborted: {source}", path.display())]
    Stream {
        path: PathBuf,
        #[source]
        source: TransferError,
    },

    #[error("Failed to scan destination directory {}: {source}", path.display())]
    ScanDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Sender errors
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Failed to open file {}: {source}", path.display())]
    OpenSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read file {}: {source}", path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Transfer of {name} failed: {source}")]
    Stream {
        name: String,
        #[source]
        source: TransferError,
    },

    #[error("A batch transfer is already running")]
    BatchInProgress,

    #[error("Failed to start transfer worker: {0}")]
    Spawn(#[source] io::Error),
}
