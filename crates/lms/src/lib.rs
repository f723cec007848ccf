//! Facade crate for the LMS features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `lms` (with `server` for the Axum state and routers).
//! - Build a [`Collaborators`] set and call [`init`] to register every feature slice.

use lms_domain::config::AppConfig;
use lms_event_bus::EventRouter;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

pub use lms_domain as domain;
pub use lms_event_bus as events;
pub use lms_kernel as kernel;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use lms_kernel::server::router::system_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use lms_compat as compat;
    pub use lms_enrollment as enrollment;
    pub use lms_notifications as notifications;
    pub use lms_registration as registration;

    /// Feature slices built by [`crate::init`].
    pub const ENABLED: &[&str] = &["compat", "enrollments", "notifications", "registration"];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

use features::compat::{CacheHost, CompatRegistry, MemoryCacheHost};
use features::enrollment::{EnrollmentStore, InMemoryEnrollmentStore};
use features::notifications::{
    DeferredQueue, InMemoryDirectory, Mailer, MemoryQueue, NotificationError, RecipientDirectory,
    TracingMailer,
};
use features::registration::{IdentityProvider, InMemoryIdentityProvider, RegistrationError};

#[lms_derive::lms_error]
pub enum LmsError {
    #[error("Notifications init failed{}: {source}", format_context(.context))]
    Notifications { source: NotificationError, context: Option<Cow<'static, str>> },

    #[error("Registration init failed{}: {source}", format_context(.context))]
    Registration { source: RegistrationError, context: Option<Cow<'static, str>> },
}

/// Everything the slices need from the outside world.
#[derive(Clone)]
pub struct Collaborators {
    pub identity: Arc<dyn IdentityProvider>,
    pub directory: Arc<dyn RecipientDirectory>,
    pub mailer: Arc<dyn Mailer>,
    pub queue: Arc<dyn DeferredQueue>,
    pub enrollments: Arc<dyn EnrollmentStore>,
    pub cache_host: Arc<dyn CacheHost>,
    pub compat: CompatRegistry,
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").field("compat", &self.compat).finish_non_exhaustive()
    }
}

impl Collaborators {
    /// In-process implementations of every collaborator; mail is only logged.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            identity: Arc::new(InMemoryIdentityProvider::new()),
            directory: Arc::new(InMemoryDirectory::new()),
            mailer: Arc::new(TracingMailer),
            queue: Arc::new(MemoryQueue::new()),
            enrollments: Arc::new(InMemoryEnrollmentStore::new()),
            cache_host: Arc::new(MemoryCacheHost::installed()),
            compat: CompatRegistry::builtin(),
        }
    }

    #[must_use]
    pub fn with_queue(mut self, queue: Arc<dyn DeferredQueue>) -> Self {
        self.queue = queue;
        self
    }
}

/// Initialize every feature slice against one event router.
///
/// # Errors
/// Returns an error if any feature initialization fails.
pub fn init(
    config: &AppConfig,
    events: &EventRouter,
    collaborators: &Collaborators,
) -> Result<Vec<domain::registry::InitializedSlice>, LmsError> {
    let mut slices = Vec::new();

    // Notifications
    slices.push(features::notifications::init(
        config,
        events,
        Arc::clone(&collaborators.directory),
        Arc::clone(&collaborators.mailer),
        Arc::clone(&collaborators.queue),
    )?);

    // Registration
    slices.push(features::registration::init(config, events, Arc::clone(&collaborators.identity))?);

    // Enrollment
    slices.push(features::enrollment::init(config, events, Arc::clone(&collaborators.enrollments)));

    // Cache compatibilities
    slices.push(features::compat::init(
        events,
        collaborators.cache_host.as_ref(),
        collaborators.compat.clone(),
    ));

    tracing::info!(slices = slices.len(), "Features initialized");
    Ok(slices)
}
