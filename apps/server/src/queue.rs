//! Deferred notification queue backed by a bounded `tokio` channel.

use lms::features::notifications::{DeferredQueue, NotificationDispatcher, ScheduledJob};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Sending half handed to the dispatch gate.
#[derive(Debug, Clone)]
pub struct ChannelQueue {
    tx: mpsc::Sender<ScheduledJob>,
}

impl ChannelQueue {
    /// Creates the queue and the receiver the worker drains. A zero capacity is
    /// raised to one.
    #[must_use]
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<ScheduledJob>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl DeferredQueue for ChannelQueue {
    fn enqueue(&self, handle: &str, payload: Value, queue: &str) {
        let job = ScheduledJob { handle: handle.to_owned(), payload, queue: queue.to_owned() };
        match self.tx.try_send(job) {
            Ok(()) => debug!(handle, queue, "Job queued"),
            Err(TrySendError::Full(job)) => {
                error!(handle = %job.handle, queue = %job.queue, "Deferred queue full, job dropped");
            },
            Err(TrySendError::Closed(job)) => {
                error!(handle = %job.handle, queue = %job.queue, "Deferred queue closed, job dropped");
            },
        }
    }
}

/// Runs queued jobs until every sender is dropped.
pub fn spawn_worker(
    mut jobs: mpsc::Receiver<ScheduledJob>,
    dispatcher: Arc<NotificationDispatcher>,
) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut processed = 0;
        while let Some(job) = jobs.recv().await {
            processed += 1;
            match dispatcher.run_scheduled(&job.handle, &job.payload) {
                Ok(()) => debug!(handle = %job.handle, "Scheduled job done"),
                Err(e) => warn!(handle = %job.handle, queue = %job.queue, error = %e, "Scheduled job failed"),
            }
        }
        info!(processed, "Notification worker stopped");
        processed
    })
}
