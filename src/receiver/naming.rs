//! Destination naming
//!
//! Generates `<prefix><n>.<ext>` inside the destination directory from a
//! process-lifetime counter. The counter is owned by the single listener
//! thread and only ever moves forward.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ReceiveError;

#[derive(Debug)]
pub struct DestinationNamer {
    dir: PathBuf,
    prefix: String,
    extension: String,
    next: u64,
}

impl DestinationNamer {
    /// Starts numbering at 1.
    pub fn new(dir: impl Into<PathBuf>, prefix: &str, extension: &str) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.to_string(),
            extension: extension.trim_start_matches('.').to_string(),
            next: 1,
        }
    }

    /// Starts numbering one past the highest name already present in the
    /// directory, so a restarted receiver does not overwrite earlier output.
    pub fn resume(dir: impl Into<PathBuf>, prefix: &str, extension: &str) -> Result<Self, ReceiveError> {
        let mut namer = Self::new(dir, prefix, extension);

        let entries = match fs::read_dir(&namer.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(namer),
            Err(source) => {
                return Err(ReceiveError::ScanDestination {
                    path: namer.dir.clone(),
                    source,
                });
            }
        };

        let highest = entries
            .flatten()
            .filter_map(|entry| namer.index_of(&entry.file_name().to_string_lossy()))
            .max();

        if let Some(highest) = highest {
            namer.next = highest + 1;
        }
        Ok(namer)
    }

    /// Returns the next destination path and advances the counter.
    pub fn next_path(&mut self) -> PathBuf {
        let path = self.path_for(self.next);
        self.next += 1;
        path
    }

    /// Number the next call to [`next_path`](Self::next_path) will use.
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, n: u64) -> PathBuf {
        self.dir
            .join(format!("{}{}.{}", self.prefix, n, self.extension))
    }

    fn index_of(&self, file_name: &str) -> Option<u64> {
        file_name
            .strip_prefix(&self.prefix)?
            .strip_suffix(&self.extension)?
            .strip_suffix('.')?
            .parse()
            .ok()
    }
}
