//! Per-request collaborators of the pipeline.
//!
//! These are bound to the visitor making the request (their session, their
//! notices, their login cookie), so they are passed to every `process` call
//! instead of being owned by the pipeline.

use lms_domain::ids::UserId;
use lms_domain::notification::Severity;
use std::fmt;

pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Scratch storage used to repopulate the form after a rejection.
pub trait SessionStore {
    fn put(&self, key: &str, value: &str);
}

pub trait NoticeSink {
    fn add_notice(&self, message: &str, severity: Severity);
}

/// Establishes an authenticated session for the visitor.
pub trait AuthSessions {
    /// # Errors
    /// Returns the transport or storage error that prevented the login.
    fn login(&self, user: UserId) -> Result<(), CollaboratorError>;
}

/// Checks a CSRF token for a named action.
pub trait NonceVerifier {
    fn verify(&self, token: &str, action: &str) -> bool;
}

/// The four request-scoped collaborators, borrowed for one `process` call.
#[derive(Clone, Copy)]
pub struct RequestContext<'a> {
    pub nonces: &'a dyn NonceVerifier,
    pub session: &'a dyn SessionStore,
    pub notices: &'a dyn NoticeSink,
    pub auth: &'a dyn AuthSessions,
}

impl fmt::Debug for RequestContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext").finish_non_exhaustive()
    }
}
