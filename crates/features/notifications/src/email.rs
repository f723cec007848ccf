//! Email notifications and their job payloads.

use crate::directory::RecipientDirectory;
use crate::error::NotificationError;
use crate::mailer::{EmailMessage, Mailer};
use crate::policy::NotificationPolicy;
use crate::templates::TemplateEngine;
use lms_domain::ids::{OrderId, UserId};
use lms_domain::notification::{NotificationKind, Subject};
use lms_kernel::safe_nanoid;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;
use tracing::info;

const RESET_KEY_LENGTH: usize = 20;

/// Something the dispatch gate can run now or hand to the deferred queue.
pub trait Notification: Send + Sync {
    fn kind(&self) -> NotificationKind;

    /// Handle the deferred queue stores to find this notification again.
    fn schedule_handle(&self) -> String {
        self.kind().schedule_handle()
    }

    /// Sends the notification for `payload` on the calling thread.
    ///
    /// # Errors
    /// Returns an error when the payload, recipient lookup or delivery fails.
    fn trigger(&self, payload: &Value) -> Result<(), NotificationError>;
}

/// Job payload for `subject`: `{"id": <raw id>}`.
#[must_use]
pub fn payload_for(subject: Subject) -> Value {
    json!({ "id": subject.raw() })
}

/// Reads the subject id back from a job payload.
///
/// # Errors
/// Returns [`NotificationError::Payload`] if `id` is absent or not an unsigned integer.
pub fn subject_id(payload: &Value) -> Result<u64, NotificationError> {
    payload.get("id").and_then(Value::as_u64).ok_or_else(|| NotificationError::Payload {
        message: format!("expected an unsigned `id`, got {payload}").into(),
        context: None,
    })
}

/// Subject type is implied by the kind: order kinds carry order ids.
#[must_use]
pub const fn subject_for(kind: NotificationKind, id: u64) -> Subject {
    if kind.is_order_kind() { Subject::Order(OrderId(id)) } else { Subject::User(UserId(id)) }
}

/// Renders a template for one kind and hands it to the mailer.
pub struct EmailNotification {
    kind: NotificationKind,
    policy: NotificationPolicy,
    directory: Arc<dyn RecipientDirectory>,
    mailer: Arc<dyn Mailer>,
    from: String,
    account_url: String,
}

impl fmt::Debug for EmailNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailNotification")
            .field("kind", &self.kind)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl EmailNotification {
    #[must_use]
    pub fn new(
        kind: NotificationKind,
        policy: NotificationPolicy,
        directory: Arc<dyn RecipientDirectory>,
        mailer: Arc<dyn Mailer>,
        from: impl Into<String>,
        account_url: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            policy,
            directory,
            mailer,
            from: from.into(),
            account_url: account_url.into(),
        }
    }

    fn render_context(&self, subject: Subject, payload: &Value) -> Value {
        let mut context = json!({ "account_url": self.account_url });
        match subject {
            Subject::Order(order) => context["order_id"] = json!(order.get()),
            Subject::User(user) => {
                context["user_id"] = json!(user.get());
                if let Some(name) = self.directory.display_name(user) {
                    context["name"] = json!(name);
                }
            },
        }

        if self.kind == NotificationKind::PasswordReset {
            // Deferred jobs carry only the id; the key is minted when the job runs.
            let key = payload
                .get("reset_key")
                .and_then(Value::as_str)
                .map_or_else(|| safe_nanoid!(RESET_KEY_LENGTH), str::to_owned);
            context["reset_key"] = json!(key);
        }
        context
    }
}

impl Notification for EmailNotification {
    fn kind(&self) -> NotificationKind {
        self.kind
    }

    fn trigger(&self, payload: &Value) -> Result<(), NotificationError> {
        let subject = subject_for(self.kind, subject_id(payload)?);
        let to = self.policy.recipients(self.kind, subject, self.directory.as_ref())?;
        let context = self.render_context(subject, payload);

        let message = EmailMessage {
            kind: self.kind,
            from: self.from.clone(),
            to,
            subject: TemplateEngine::render_subject(self.kind, &context),
            body: TemplateEngine::render_body(self.kind, &context),
        };
        self.mailer.send(&message)?;

        info!(kind = %self.kind, %subject, recipients = message.to.len(), "Notification triggered");
        Ok(())
    }
}
