use lms_event_bus::BoxError;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestEvent(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherEvent(pub usize);

/// Records handler invocations in call order.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

pub fn failing(message: &str) -> BoxError {
    message.to_owned().into()
}
