//! Sender result types

/// One file streamed to the receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentFile {
    pub name: String,
    pub bytes: u64,
    pub chunks: usize,
}

/// Outcome of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub sent: Vec<SentFile>,
    /// Names that failed, in queue order.
    pub failed: Vec<String>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.sent.len() + self.failed.len()
    }

    /// True when the batch ran at least one file and none failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && !self.sent.is_empty()
    }
}
