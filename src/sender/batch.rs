//! Module `batch`
//!
//! Runs the transfer client over every queued name, one file at a time and
//! in queue order, reporting batch-level status transitions. The receiver
//! serves a single connection at a time, so files are never sent in
//! parallel.

use log::{info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crate::error::{SendError, status_for_send};
use crate::progress::{ProgressSink, Status};
use crate::sender::client::TransferClient;
use crate::sender::queue::SelectionQueue;
use crate::sender::results::BatchReport;

pub struct BatchRunner {
    client: TransferClient,
    queue: SelectionQueue,
    progress: ProgressSink,
    running: Arc<AtomicBool>,
}

/// Clears the running flag when the worker finishes, panics included.
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl BatchRunner {
    pub fn new(client: TransferClient, queue: SelectionQueue, progress: ProgressSink) -> Self {
        Self {
            client,
            queue,
            progress,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn queue(&self) -> &SelectionQueue {
        &self.queue
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Starts one batch on a detached worker thread. A second request while
    /// a batch is still running is rejected.
    pub fn spawn(self: &Arc<Self>) -> Result<JoinHandle<BatchReport>, SendError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Send requested while a batch is already running");
            return Err(SendError::BatchInProgress);
        }

        let guard = RunGuard(Arc::clone(&self.running));
        let runner = Arc::clone(self);

        thread::Builder::new()
            .name("sender".to_string())
            .spawn(move || {
                let _guard = guard;
                runner.run_batch()
            })
            // On failure the closure, and the guard with it, is dropped.
            .map_err(SendError::Spawn)
    }

    /// Runs one batch on the calling thread.
    pub fn run(&self) -> Result<BatchReport, SendError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SendError::BatchInProgress);
        }
        let _guard = RunGuard(Arc::clone(&self.running));
        Ok(self.run_batch())
    }

    fn run_batch(&self) -> BatchReport {
        let names = self.queue.snapshot();
        let mut report = BatchReport::default();

        if names.is_empty() {
            info!("Send requested with no files selected");
            self.progress.status(Status::NothingSelected);
            return report;
        }

        info!("Transferring {} file(s) to {}", names.len(), self.client.receiver());
        self.progress.status(Status::Transferring);

        for name in names {
            match self.client.send_file(&name) {
                Ok(sent) => report.sent.push(sent),
                Err(e) => {
                    warn!("Skipping {}: {}", name, e);
                    self.progress.status(status_for_send(&name, &e));
                    report.failed.push(name);
                }
            }
        }

        if report.failed.is_empty() {
            info!("All {} file(s) transferred", report.sent.len());
            self.progress.status(Status::AllTransferred);
            self.queue.clear();
        } else {
            warn!(
                "Batch finished with {} of {} file(s) failed; selection kept",
                report.failed.len(),
                report.total()
            );
            self.progress.status(Status::BatchIncomplete {
                failed: report.failed.len(),
                total: report.total(),
            });
        }

        report
    }
}
