//! Receiver result types

use std::net::SocketAddr;
use std::path::PathBuf;

/// How a received stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A standalone `EOF` chunk arrived.
    Marker,
    /// The peer closed right after a marker that arrived glued to payload.
    TrailingMarker,
    /// The peer closed without sending a marker.
    PeerClosed,
}

/// One completed connection.
#[derive(Debug, Clone)]
pub struct ReceivedFile {
    pub path: PathBuf,
    pub peer: SocketAddr,
    pub bytes: u64,
    pub termination: Termination,
}
