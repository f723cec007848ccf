//! Accumulate-all validation of a registration submission.

use crate::submission::RegistrationSubmission;
use lms_domain::config::RegistrationConfig;
use std::borrow::Cow;
use std::fmt;
use validator::ValidateEmail;

pub const USERNAME_REQUIRED: &str = "username_required";
pub const EMAIL_REQUIRED: &str = "email_required";
pub const INVALID_EMAIL: &str = "invalid_email";
pub const FIRST_NAME_REQUIRED: &str = "first_name_required";
pub const LAST_NAME_REQUIRED: &str = "last_name_required";
pub const PASSWORD_REQUIRED: &str = "password_required";
pub const CONFIRM_PASSWORD_REQUIRED: &str = "confirm_password_required";
pub const PASSWORDS_DO_NOT_MATCH: &str = "passwords_do_not_match";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Failure {
    code: Cow<'static, str>,
    messages: Vec<Cow<'static, str>>,
}

/// Ordered failures keyed by unique code. Empty means the submission is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    failures: Vec<Failure>,
}

impl ValidationResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure. A repeated code keeps its position and gains the message.
    pub fn add(&mut self, code: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) {
        let code = code.into();
        let message = message.into();
        match self.failures.iter_mut().find(|failure| failure.code == code) {
            Some(failure) => failure.messages.push(message),
            None => self.failures.push(Failure { code, messages: vec![message] }),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.failures.iter().any(|failure| failure.code == code)
    }

    /// Codes in first-insertion order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|failure| failure.code.as_ref())
    }

    /// Every message, grouped by code in first-insertion order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().flat_map(|failure| failure.messages.iter().map(AsRef::as_ref))
    }

    #[must_use]
    pub fn messages_for(&self, code: &str) -> Vec<&str> {
        self.failures
            .iter()
            .find(|failure| failure.code == code)
            .map(|failure| failure.messages.iter().map(AsRef::as_ref).collect())
            .unwrap_or_default()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.codes().collect();
        f.write_str(&codes.join(", "))
    }
}

/// Extra rules run after the built-in ones; they may only add failures.
pub trait SubmissionValidator: Send + Sync {
    fn validate(&self, submission: &RegistrationSubmission, result: &mut ValidationResult);
}

/// Runs every built-in rule; none short-circuits another.
#[must_use]
pub fn validate(submission: &RegistrationSubmission, config: &RegistrationConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    if !config.generate_username && submission.username.is_empty() {
        result.add(USERNAME_REQUIRED, "Username is required.");
    }

    if submission.email.is_empty() {
        result.add(EMAIL_REQUIRED, "Email is required.");
    }

    if !submission.email.validate_email() {
        result.add(INVALID_EMAIL, "Email is invalid.");
    }

    if submission.first_name.is_empty() {
        result.add(FIRST_NAME_REQUIRED, "First name is required.");
    }

    if submission.last_name.is_empty() {
        result.add(LAST_NAME_REQUIRED, "Last name is required.");
    }

    if !config.generate_password {
        if submission.password.is_empty() {
            result.add(PASSWORD_REQUIRED, "Password is required.");
        }

        if submission.confirm_password.is_empty() {
            result.add(CONFIRM_PASSWORD_REQUIRED, "Confirm password is required.");
        }

        if submission.password != submission.confirm_password {
            result.add(PASSWORDS_DO_NOT_MATCH, "The passwords do not match.");
        }
    }

    result
}
