//! Outgoing email transport.
//!
//! Delivery sits behind [`Mailer`] so the pipeline can be exercised without SMTP.
//! [`TracingMailer`] only logs, [`MemoryMailer`] keeps every message for inspection.

use crate::error::NotificationError;
use lms_domain::notification::NotificationKind;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub kind: NotificationKind,
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

pub trait Mailer: Send + Sync {
    /// Sends one message.
    ///
    /// # Errors
    /// Returns [`NotificationError::Delivery`] when the transport rejects the message.
    fn send(&self, message: &EmailMessage) -> Result<(), NotificationError>;
}

/// Writes each message to the log instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMailer;

impl Mailer for TracingMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        info!(
            kind = %message.kind,
            from = %message.from,
            to = ?message.to,
            subject = %message.subject,
            "Email sent"
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<EmailMessage>>,
    fail_with: Mutex<Option<String>>,
}

impl MemoryMailer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }

    /// Makes every following `send` fail with `message`; `None` restores delivery.
    pub fn fail_with(&self, message: Option<&str>) {
        *self.fail_with.lock() = message.map(str::to_owned);
    }
}

impl Mailer for MemoryMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        if let Some(reason) = self.fail_with.lock().clone() {
            return Err(NotificationError::Delivery {
                message: reason.into(),
                context: Some(message.kind.id().into()),
            });
        }
        self.sent.lock().push(message.clone());
        Ok(())
    }
}
