//! Immediate-versus-deferred dispatch.

use crate::email::Notification;
use crate::error::NotificationError;
use lms_domain::config::AppConfig;
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// External deferred-execution queue. Fire-and-forget: nothing is returned.
pub trait DeferredQueue: Send + Sync {
    fn enqueue(&self, handle: &str, payload: Value, queue: &str);
}

/// Which path [`DispatchGate::dispatch`] took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchDecision {
    Immediate,
    Deferred { handle: String, payload: Value, queue: String },
}

/// Runs a notification inline or enqueues it, depending on `email.schedule_enabled`.
pub struct DispatchGate {
    config: AppConfig,
    queue: Arc<dyn DeferredQueue>,
}

impl fmt::Debug for DispatchGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchGate")
            .field("schedule_enabled", &self.config.email.schedule_enabled)
            .field("queue", &self.config.email.queue)
            .finish_non_exhaustive()
    }
}

impl DispatchGate {
    #[must_use]
    pub fn new(config: AppConfig, queue: Arc<dyn DeferredQueue>) -> Self {
        Self { config, queue }
    }

    /// Exactly one of enqueue or trigger happens per call.
    ///
    /// # Errors
    /// Propagates the error of an immediate `trigger`. Enqueueing cannot fail.
    pub fn dispatch(
        &self,
        notification: &dyn Notification,
        payload: Value,
    ) -> Result<DispatchDecision, NotificationError> {
        let schedule_enabled = self.config.email.schedule_enabled;
        let kind = notification.kind();

        if schedule_enabled {
            let handle = notification.schedule_handle();
            let queue = self.config.email.queue.clone();
            self.queue.enqueue(&handle, payload.clone(), &queue);
            debug!(%kind, %handle, %queue, "Notification deferred");
            Ok(DispatchDecision::Deferred { handle, payload, queue })
        } else {
            notification.trigger(&payload)?;
            debug!(%kind, "Notification sent immediately");
            Ok(DispatchDecision::Immediate)
        }
    }
}

/// A job accepted by [`MemoryQueue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledJob {
    pub handle: String,
    pub payload: Value,
    pub queue: String,
}

/// Queue that only records jobs; callers drain and run them.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    jobs: Mutex<Vec<ScheduledJob>>,
}

impl MemoryQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn jobs(&self) -> Vec<ScheduledJob> {
        self.jobs.lock().clone()
    }

    pub fn drain(&self) -> Vec<ScheduledJob> {
        std::mem::take(&mut *self.jobs.lock())
    }
}

impl DeferredQueue for MemoryQueue {
    fn enqueue(&self, handle: &str, payload: Value, queue: &str) {
        self.jobs.lock().push(ScheduledJob {
            handle: handle.to_owned(),
            payload,
            queue: queue.to_owned(),
        });
    }
}
