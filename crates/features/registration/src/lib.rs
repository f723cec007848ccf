//! Registration feature slice.
//!
//! Turns a posted registration form into an account: token check, sanitizing,
//! validation, account creation, `UserRegistered` publication, then an optional
//! login plus redirect to the dashboard. See [`RegistrationPipeline::process`].

pub mod account;
pub mod context;
mod error;
pub mod extension;
pub mod memory;
pub mod pipeline;
pub mod redirect;
pub mod submission;
pub mod validation;

pub use crate::account::{Account, AccountError, IdentityProvider, NewAccount};
pub use crate::context::{AuthSessions, NonceVerifier, NoticeSink, RequestContext, SessionStore};
pub use crate::error::{RegistrationError, RegistrationErrorExt};
pub use crate::extension::RegistrationExtension;
pub use crate::memory::{
    AcceptToken, InMemoryIdentityProvider, MemorySession, Notice, NoticeLog, RecordingAuth,
};
pub use crate::pipeline::{Outcome, RegistrationPipeline};
pub use crate::redirect::RedirectPolicy;
pub use crate::submission::{FormData, FormField, RegistrationSubmission};
pub use crate::validation::{SubmissionValidator, ValidationResult};

use lms_event_bus::EventRouter;
use lms_kernel::domain::config::AppConfig;
use lms_kernel::domain::registry::InitializedSlice;
use std::sync::Arc;

/// Registration feature state
#[lms_derive::lms_slice]
#[derive(Debug)]
pub struct Registration {
    pub pipeline: RegistrationPipeline,
}

/// Builds the registration pipeline.
///
/// # Errors
/// Returns [`RegistrationError::Config`] if the account page URL is unusable.
pub fn init(
    config: &AppConfig,
    events: &EventRouter,
    identity: Arc<dyn IdentityProvider>,
) -> Result<InitializedSlice, RegistrationError> {
    let pipeline = RegistrationPipeline::new(config.clone(), identity, events.clone())?;

    tracing::info!(
        redirect = %pipeline.redirects().default_destination(),
        auth_new_user = config.registration.auth_new_user,
        "Registration slice initialized"
    );

    Ok(InitializedSlice::new(Registration::new(RegistrationInner { pipeline })))
}
