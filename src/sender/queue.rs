//! Selection queue
//!
//! Ordered list of file names chosen by the operator. Cloning yields
//! another handle to the same queue so the selection handler and the batch
//! worker can share it across threads.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Default)]
pub struct SelectionQueue {
    names: Arc<Mutex<Vec<String>>>,
}

impl SelectionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends at the tail; duplicates are kept.
    pub fn append(&self, name: impl Into<String>) {
        self.lock().push(name.into());
    }

    /// Current contents in insertion order.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Empties the queue.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Removes the entry at `index`, keeping the others in order.
    pub fn remove(&self, index: usize) -> Option<String> {
        let mut names = self.lock();
        (index < names.len()).then(|| names.remove(index))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        // A panicked holder cannot leave a Vec<String> half-updated.
        self.names.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for SelectionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.lock();
        if names.is_empty() {
            write!(f, "No files selected.")
        } else {
            write!(f, "{}", names.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_append_keeps_order_and_duplicates() {
        let queue = SelectionQueue::new();
        queue.append("b.mp4");
        queue.append("a.mp4");
        queue.append("b.mp4");
        assert_eq!(queue.snapshot(), vec!["b.mp4", "a.mp4", "b.mp4"]);
        assert_eq!(queue.to_string(), "b.mp4, a.mp4, b.mp4");
    }

    #[test]
    fn test_clear_and_empty_summary() {
        let queue = SelectionQueue::new();
        assert_eq!(queue.to_string(), "No files selected.");
        queue.append("a.mp4");
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_remove_preserves_rest() {
        let queue = SelectionQueue::new();
        for name in ["a.mp4", "b.mp4", "c.mp4"] {
            queue.append(name);
        }
        assert_eq!(queue.remove(1), Some("b.mp4".to_string()));
        assert_eq!(queue.remove(5), None);
        assert_eq!(queue.snapshot(), vec!["a.mp4", "c.mp4"]);
    }

    #[test]
    fn test_handles_share_state_across_threads() {
        let queue = SelectionQueue::new();
        let other = queue.clone();
        thread::spawn(move || other.append("clip.mkv")).join().unwrap();
        assert_eq!(queue.snapshot(), vec!["clip.mkv"]);
    }
}
