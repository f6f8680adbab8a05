//! Termination marker
//!
//! The sender ends every stream with the three ASCII bytes `EOF` written as
//! their own message. The receiver has no framing to go on, so a received
//! chunk that is exactly those three bytes ends the stream. Payload that
//! happens to arrive as a standalone `EOF` chunk is cut short there; that
//! is a known property of the wire format.

/// Bytes written after the payload to mark the end of a file.
pub const EOF_MARKER: &[u8; 3] = b"EOF";

/// Length of [`EOF_MARKER`].
pub const MARKER_LEN: usize = EOF_MARKER.len();

/// Whether a received chunk is the standalone termination marker.
pub fn is_marker(chunk: &[u8]) -> bool {
    chunk == EOF_MARKER
}

/// Keeps the most recent `MARKER_LEN` bytes of a stream out of the
/// destination until it is known whether they were payload or a marker
/// that TCP delivered in the same read as the last payload bytes.
#[derive(Debug, Default)]
pub struct TrailingHold {
    held: Vec<u8>,
}

impl TrailingHold {
    pub fn new() -> Self {
        Self {
            held: Vec::with_capacity(MARKER_LEN),
        }
    }

    /// Feeds a payload chunk. Bytes that are now safe to write are
    /// appended to `out`.
    pub fn push(&mut self, chunk: &[u8], out: &mut Vec<u8>) {
        let total = self.held.len() + chunk.len();
        if total <= MARKER_LEN {
            self.held.extend_from_slice(chunk);
            return;
        }

        let release = total - MARKER_LEN;
        if release <= self.held.len() {
            out.extend_from_slice(&self.held[..release]);
            self.held.drain(..release);
            self.held.extend_from_slice(chunk);
        } else {
            out.extend_from_slice(&self.held);
            let from_chunk = release - self.held.len();
            out.extend_from_slice(&chunk[..from_chunk]);
            self.held.clear();
            self.held.extend_from_slice(&chunk[from_chunk..]);
        }
    }

    /// A standalone marker arrived: everything held back is payload.
    pub fn release(self) -> Vec<u8> {
        self.held
    }

    /// The peer closed without a standalone marker. Returns the bytes still
    /// to be written and whether a trailing marker was dropped.
    pub fn finish(self) -> (Vec<u8>, bool) {
        if is_marker(&self.held) {
            (Vec::new(), true)
        } else {
            (self.held, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(chunks: &[&[u8]]) -> (Vec<u8>, TrailingHold) {
        let mut hold = TrailingHold::new();
        let mut out = Vec::new();
        for chunk in chunks {
            hold.push(chunk, &mut out);
        }
        (out, hold)
    }

    #[test]
    fn test_is_marker_needs_exact_chunk() {
        assert!(is_marker(b"EOF"));
        assert!(!is_marker(b"EOFX"));
        assert!(!is_marker(b"EO"));
        assert!(!is_marker(b"eof"));
    }

    #[test]
    fn test_coalesced_marker_is_dropped() {
        let (out, hold) = feed(&[b"hello world", b"tailEOF"]);
        assert_eq!(out, b"hello worldtail");
        let (rest, stripped) = hold.finish();
        assert!(stripped);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_marker_split_across_reads() {
        let (out, hold) = feed(&[b"payloadE", b"O", b"F"]);
        assert_eq!(out, b"payload");
        assert_eq!(hold.finish(), (Vec::new(), true));
    }

    #[test]
    fn test_release_keeps_payload_before_standalone_marker() {
        let (mut out, hold) = feed(&[b"abcdef"]);
        out.extend(hold.release());
        assert_eq!(out, b"abcdef");
    }

    #[test]
    fn test_close_without_marker_keeps_everything() {
        let (mut out, hold) = feed(&[b"ab", b"cd"]);
        let (rest, stripped) = hold.finish();
        assert!(!stripped);
        out.extend(rest);
        assert_eq!(out, b"abcd");
    }
}
