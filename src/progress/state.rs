//! Observer-side view of a transfer, built by folding progress events.

use std::path::PathBuf;

use crate::progress::{ProgressEvent, Status};

/// What an observer would currently display.
#[derive(Debug, Default, Clone)]
pub struct ProgressState {
    fraction: f64,
    bytes: u64,
    status: Option<Status>,
    received: Vec<PathBuf>,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event; returns `true` when the visible state changed.
    pub fn apply(&mut self, event: &ProgressEvent) -> bool {
        match event {
            ProgressEvent::Fraction(f) => {
                let changed = *f != self.fraction;
                self.fraction = *f;
                changed
            }
            ProgressEvent::Bytes(n) => {
                let changed = *n != self.bytes;
                self.bytes = *n;
                changed
            }
            ProgressEvent::Reset => {
                let changed = self.bytes != 0 || self.fraction != 0.0;
                self.bytes = 0;
                self.fraction = 0.0;
                changed
            }
            ProgressEvent::FileReceived(path) => {
                self.received.push(path.clone());
                true
            }
            ProgressEvent::Status(status) => {
                let changed = self.status.as_ref() != Some(status);
                self.status = Some(status.clone());
                changed
            }
        }
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Sender progress as a whole percentage, the way a progress bar labels it.
    pub fn percent_label(&self) -> String {
        format!("{:.0}%", self.fraction * 100.0)
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Receiver progress label; the total is never known on that side.
    pub fn bytes_label(&self) -> String {
        format!("{} bytes", self.bytes)
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn received(&self) -> &[PathBuf] {
        &self.received
    }

    /// Newline-separated list of received files.
    pub fn received_summary(&self) -> String {
        if self.received.is_empty() {
            return "No files received yet.".to_string();
        }
        self.received
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
