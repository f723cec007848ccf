//! Notification feature slice: policy, dispatch gate, email notifications and the
//! event routes that trigger them.
//!
//! ## Flow
//! A domain event reaches a route registered on the [`EventRouter`]. The route's
//! guard picks the subject, the [`NotificationPolicy`] decides whether the kind is
//! enabled, and the [`DispatchGate`] either triggers the notification inline or
//! hands `(handle, payload, queue)` to the [`DeferredQueue`].

pub mod directory;
pub mod dispatcher;
pub mod email;
mod error;
pub mod gate;
pub mod mailer;
pub mod policy;
pub mod routes;
pub mod templates;

pub use crate::directory::{InMemoryDirectory, RecipientDirectory};
pub use crate::dispatcher::NotificationDispatcher;
pub use crate::email::{EmailNotification, Notification, payload_for, subject_id};
pub use crate::error::{NotificationError, NotificationErrorExt};
pub use crate::gate::{DeferredQueue, DispatchDecision, DispatchGate, MemoryQueue, ScheduledJob};
pub use crate::mailer::{EmailMessage, Mailer, MemoryMailer, TracingMailer};
pub use crate::policy::NotificationPolicy;

use lms_event_bus::{EventRouter, HandlerId};
use lms_kernel::domain::config::AppConfig;
use lms_kernel::domain::registry::InitializedSlice;
use std::sync::Arc;

/// Notifications feature state
#[lms_derive::lms_slice]
#[derive(Debug)]
pub struct Notifications {
    pub dispatcher: Arc<NotificationDispatcher>,
    pub routes: Vec<HandlerId>,
}

/// Builds the email dispatcher and registers its routes on `events`.
///
/// # Errors
/// Returns [`NotificationError::Internal`] if scheduling is enabled without a queue name.
pub fn init(
    config: &AppConfig,
    events: &EventRouter,
    directory: Arc<dyn RecipientDirectory>,
    mailer: Arc<dyn Mailer>,
    queue: Arc<dyn DeferredQueue>,
) -> Result<InitializedSlice, NotificationError> {
    if config.email.schedule_enabled && config.email.queue.trim().is_empty() {
        return Err(NotificationError::Internal {
            message: "email.queue must be set when email.schedule_enabled is on".into(),
            context: Some("Validating email config".into()),
        });
    }

    let dispatcher = Arc::new(NotificationDispatcher::email(config, directory, mailer, queue));
    let routes = routes::register(events, &dispatcher);

    tracing::info!(
        routes = routes.len(),
        scheduled = config.email.schedule_enabled,
        "Notifications slice initialized"
    );

    Ok(InitializedSlice::new(Notifications::new(NotificationsInner { dispatcher, routes })))
}
