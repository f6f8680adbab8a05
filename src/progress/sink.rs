//! Module `sink`
//!
//! Cross-thread hand-off of progress from transfer workers to an observer.
//! Workers hold a cloneable [`ProgressSink`] and publish fire-and-forget;
//! the observer owns the single [`ProgressFeed`] and drains it on its own
//! thread. Publishing never blocks and never fails, even when nobody is
//! listening any more.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryIter, unbounded};
use std::path::PathBuf;
use std::time::Duration;

use crate::progress::Status;

/// One observable change in transfer state.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Sender side: fraction of the current file sent, in `[0, 1]`.
    Fraction(f64),
    /// Receiver side: absolute bytes written for the current file.
    Bytes(u64),
    /// Receiver finished a file; progress display returns to zero.
    Reset,
    /// Receiver recorded a completed destination file.
    FileReceived(PathBuf),
    /// Status line transition.
    Status(Status),
}

/// Producer half, handed to every worker.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: Sender<ProgressEvent>,
}

/// Consumer half, owned by the observer.
#[derive(Debug)]
pub struct ProgressFeed {
    rx: Receiver<ProgressEvent>,
}

impl ProgressSink {
    /// Creates a connected sink/feed pair.
    pub fn channel() -> (ProgressSink, ProgressFeed) {
        let (tx, rx) = unbounded();
        (ProgressSink { tx }, ProgressFeed { rx })
    }

    /// A sink whose events go nowhere.
    pub fn detached() -> ProgressSink {
        let (sink, _feed) = Self::channel();
        sink
    }

    pub fn publish(&self, event: ProgressEvent) {
        // A dropped feed just means nobody is watching.
        let _ = self.tx.send(event);
    }

    pub fn status(&self, status: Status) {
        self.publish(ProgressEvent::Status(status));
    }

    pub fn fraction(&self, fraction: f64) {
        self.publish(ProgressEvent::Fraction(fraction.clamp(0.0, 1.0)));
    }

    pub fn bytes(&self, bytes: u64) {
        self.publish(ProgressEvent::Bytes(bytes));
    }
}

impl ProgressFeed {
    /// Drains whatever is queued right now without waiting.
    pub fn try_iter(&self) -> TryIter<'_, ProgressEvent> {
        self.rx.try_iter()
    }

    /// Waits up to `timeout` for the next event.
    ///
    /// Returns `None` on timeout or once every sink has been dropped.
    pub fn next_timeout(&self, timeout: Duration) -> Option<ProgressEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Blocks until the next event; `None` once every sink is gone.
    pub fn recv(&self) -> Option<ProgressEvent> {
        self.rx.recv().ok()
    }

    /// Waits until an event matching `predicate` arrives, collecting every
    /// event seen on the way (the matching one included). Gives up after
    /// `timeout` of silence.
    pub fn wait_for<F>(&self, timeout: Duration, mut predicate: F) -> Vec<ProgressEvent>
    where
        F: FnMut(&ProgressEvent) -> bool,
    {
        let mut seen = Vec::new();
        while let Some(event) = self.next_timeout(timeout) {
            let done = predicate(&event);
            seen.push(event);
            if done {
                break;
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_events_cross_threads_in_order() {
        let (sink, feed) = ProgressSink::channel();

        let worker = {
            let sink = sink.clone();
            thread::spawn(move || {
                for n in 1..=3u64 {
                    sink.bytes(n * 10);
                }
                sink.status(Status::WaitingForSender);
            })
        };
        worker.join().unwrap();

        let events: Vec<_> = feed.try_iter().collect();
        assert_eq!(
            events,
            vec![
                ProgressEvent::Bytes(10),
                ProgressEvent::Bytes(20),
                ProgressEvent::Bytes(30),
                ProgressEvent::Status(Status::WaitingForSender),
            ]
        );
    }

    #[test]
    fn test_publish_without_observer_is_silent() {
        let sink = ProgressSink::detached();
        sink.fraction(0.5);
        sink.status(Status::Transferring);
    }

    #[test]
    fn test_fraction_is_clamped() {
        let (sink, feed) = ProgressSink::channel();
        sink.fraction(1.7);
        sink.fraction(-0.2);
        let events: Vec<_> = feed.try_iter().collect();
        assert_eq!(
            events,
            vec![ProgressEvent::Fraction(1.0), ProgressEvent::Fraction(0.0)]
        );
    }

    #[test]
    fn test_wait_for_stops_at_match() {
        let (sink, feed) = ProgressSink::channel();
        sink.bytes(1);
        sink.publish(ProgressEvent::Reset);
        sink.bytes(2);

        let seen = feed.wait_for(Duration::from_millis(50), |e| {
            matches!(e, ProgressEvent::Reset)
        });
        assert_eq!(seen, vec![ProgressEvent::Bytes(1), ProgressEvent::Reset]);
        assert_eq!(feed.try_iter().count(), 1);
    }
}
