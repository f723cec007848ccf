use crate::directory::RecipientDirectory;
use crate::email::{EmailNotification, Notification, payload_for};
use crate::error::NotificationError;
use crate::gate::{DeferredQueue, DispatchDecision, DispatchGate};
use crate::mailer::Mailer;
use crate::policy::NotificationPolicy;
use fxhash::FxHashMap;
use lms_domain::config::AppConfig;
use lms_domain::notification::{NotificationKind, Subject};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Policy check followed by the dispatch gate, for every registered kind.
pub struct NotificationDispatcher {
    policy: NotificationPolicy,
    gate: DispatchGate,
    notifications: FxHashMap<NotificationKind, Arc<dyn Notification>>,
}

impl fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.notifications.keys().copied().collect();
        kinds.sort_unstable();
        f.debug_struct("NotificationDispatcher")
            .field("policy", &self.policy)
            .field("gate", &self.gate)
            .field("kinds", &kinds)
            .finish()
    }
}

impl NotificationDispatcher {
    #[must_use]
    pub fn new(policy: NotificationPolicy, gate: DispatchGate) -> Self {
        Self { policy, gate, notifications: FxHashMap::default() }
    }

    /// Dispatcher with an [`EmailNotification`] for every kind.
    #[must_use]
    pub fn email(
        config: &AppConfig,
        directory: Arc<dyn RecipientDirectory>,
        mailer: Arc<dyn Mailer>,
        queue: Arc<dyn DeferredQueue>,
    ) -> Self {
        let policy = NotificationPolicy::new(config.clone());
        let gate = DispatchGate::new(config.clone(), queue);

        NotificationKind::ALL.into_iter().fold(Self::new(policy.clone(), gate), |dispatcher, kind| {
            dispatcher.with_notification(Arc::new(EmailNotification::new(
                kind,
                policy.clone(),
                Arc::clone(&directory),
                Arc::clone(&mailer),
                config.email.from_address.clone(),
                config.registration.account_page_url.clone(),
            )))
        })
    }

    /// Registers (or replaces) the notification for its kind.
    #[must_use]
    pub fn with_notification(mut self, notification: Arc<dyn Notification>) -> Self {
        self.notifications.insert(notification.kind(), notification);
        self
    }

    #[must_use]
    pub const fn policy(&self) -> &NotificationPolicy {
        &self.policy
    }

    /// Sends or enqueues `kind` about `subject`.
    ///
    /// Returns `Ok(None)` when the kind is disabled; nothing else happens then.
    ///
    /// # Errors
    /// [`NotificationError::Unknown`] if no notification is registered for `kind`,
    /// or the error of an immediate trigger.
    pub fn notify(
        &self,
        kind: NotificationKind,
        subject: Subject,
    ) -> Result<Option<DispatchDecision>, NotificationError> {
        if !self.policy.is_enabled(kind) {
            debug!(%kind, %subject, "Notification disabled");
            return Ok(None);
        }

        let notification = self.notification(kind)?;
        self.gate.dispatch(notification.as_ref(), payload_for(subject)).map(Some)
    }

    /// Runs a job previously handed to the deferred queue.
    ///
    /// The kind is checked again, so disabling a notification also drops its
    /// queued jobs.
    ///
    /// # Errors
    /// [`NotificationError::Unknown`] for an unrecognised handle, or the trigger error.
    pub fn run_scheduled(&self, handle: &str, payload: &Value) -> Result<(), NotificationError> {
        let kind = NotificationKind::from_schedule_handle(handle).ok_or_else(|| {
            NotificationError::Unknown { message: handle.to_owned().into(), context: None }
        })?;

        if !self.policy.is_enabled(kind) {
            debug!(%kind, handle, "Scheduled notification skipped: disabled");
            return Ok(());
        }

        self.notification(kind)?.trigger(payload)
    }

    fn notification(&self, kind: NotificationKind) -> Result<&Arc<dyn Notification>, NotificationError> {
        self.notifications.get(&kind).ok_or_else(|| NotificationError::Unknown {
            message: kind.id().into(),
            context: Some("No notification registered".into()),
        })
    }
}
