//! Registration form processing.
//!
//! `Received -> Validating -> {Rejected, Accepted}`. Every failure ends as
//! [`Outcome::Rejected`] after the visitor has been told why; nothing escapes
//! [`RegistrationPipeline::process`], panics included.

use crate::account::{Account, AccountError, IdentityProvider, NewAccount};
use crate::context::RequestContext;
use crate::error::RegistrationError;
use crate::extension::RegistrationExtension;
use crate::redirect::RedirectPolicy;
use crate::submission::{FormData, RegistrationSubmission};
use crate::validation::{SubmissionValidator, validate};
use lms_domain::config::AppConfig;
use lms_domain::constants::{NONCE_FIELD, REGISTER_ACTION, REGISTRATION_MARKER};
use lms_domain::events::UserRegistered;
use lms_domain::notification::Severity;
use lms_domain::roles::Role;
use lms_event_bus::EventRouter;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;

const CREATED_WITH_GENERATED_PASSWORD: &str =
    "Your account was created successfully and a password has been sent to your email address.";
const CREATED: &str =
    "Your account was created successfully. Your login details have been sent to your email address.";

/// Result of one [`RegistrationPipeline::process`] call.
#[derive(Debug)]
pub enum Outcome {
    /// The request was not a registration submission.
    Ignored,
    Rejected(RegistrationError),
    /// `redirect` is set only when the new user was logged in.
    Registered { account: Account, redirect: Option<Url> },
}

pub struct RegistrationPipeline {
    config: AppConfig,
    identity: Arc<dyn IdentityProvider>,
    events: EventRouter,
    redirects: RedirectPolicy,
    validators: Vec<Arc<dyn SubmissionValidator>>,
    extensions: Vec<Arc<dyn RegistrationExtension>>,
}

impl fmt::Debug for RegistrationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationPipeline")
            .field("redirects", &self.redirects)
            .field("validators", &self.validators.len())
            .field("extensions", &self.extensions.len())
            .finish_non_exhaustive()
    }
}

impl RegistrationPipeline {
    /// # Errors
    /// Returns [`RegistrationError::Config`] if the account page URL is unusable.
    pub fn new(
        config: AppConfig,
        identity: Arc<dyn IdentityProvider>,
        events: EventRouter,
    ) -> Result<Self, RegistrationError> {
        let redirects = RedirectPolicy::from_config(&config.registration)?;
        Ok(Self {
            config,
            identity,
            events,
            redirects,
            validators: Vec::new(),
            extensions: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn SubmissionValidator>) -> Self {
        self.validators.push(validator);
        self
    }

    #[must_use]
    pub fn with_extension(mut self, extension: Arc<dyn RegistrationExtension>) -> Self {
        self.extensions.push(extension);
        self
    }

    #[must_use]
    pub const fn redirects(&self) -> &RedirectPolicy {
        &self.redirects
    }

    /// Handles one form post.
    ///
    /// Without the registration marker field this is a no-op. Otherwise every
    /// failure, including a panic in a collaborator, is reported through the
    /// notice sink and returned as [`Outcome::Rejected`].
    pub fn process(&self, form: &FormData, ctx: &RequestContext<'_>) -> Outcome {
        if !form.contains_key(REGISTRATION_MARKER) {
            return Outcome::Ignored;
        }

        let error = match catch_unwind(AssertUnwindSafe(|| self.run(form, ctx))) {
            Ok(Ok(outcome)) => return outcome,
            Ok(Err(error)) => error,
            Err(payload) => RegistrationError::UnexpectedFault {
                message: panic_message(payload.as_ref()),
                context: Some("Registration panicked".into()),
            },
        };

        self.reject(form, ctx, &error);
        Outcome::Rejected(error)
    }

    fn run(&self, form: &FormData, ctx: &RequestContext<'_>) -> Result<Outcome, RegistrationError> {
        let token = form.get(NONCE_FIELD).map_or("", |token| token.trim());
        if token.is_empty() {
            return Err(RegistrationError::MissingToken {
                message: "Nonce is missing.".into(),
                context: None,
            });
        }
        if !ctx.nonces.verify(token, REGISTER_ACTION) {
            return Err(RegistrationError::InvalidToken {
                message: "Invalid nonce.".into(),
                context: None,
            });
        }

        let submission = RegistrationSubmission::from_form(form);
        let mut failures = validate(&submission, &self.config.registration);
        for validator in &self.validators {
            validator.validate(&submission, &mut failures);
        }
        if !failures.is_empty() {
            return Err(RegistrationError::ValidationFailure { failures, context: None });
        }

        let account = self
            .identity
            .create_account(NewAccount::from_submission(submission, Role::Student))
            .map_err(|e| match e {
                AccountError::Rejected { message, .. } => RegistrationError::AccountCreationFailure {
                    message,
                    context: Some("Creating account".into()),
                },
                AccountError::Unavailable { message, .. } => RegistrationError::UnexpectedFault {
                    message,
                    context: Some("Creating account".into()),
                },
            })?;

        let created = if self.config.registration.generate_password {
            CREATED_WITH_GENERATED_PASSWORD
        } else {
            CREATED
        };
        ctx.notices.add_notice(created, Severity::Info);

        let report =
            self.events.dispatch(&UserRegistered { user_id: account.id, roles: account.role.into() });
        if !report.is_clean() {
            warn!(user_id = %account.id, failed = report.failures.len(), "UserRegistered handlers failed");
        }

        let redirect = self.redirect(&account, ctx)?;
        info!(
            user_id = %account.id,
            role = account.role.as_str(),
            redirect = redirect.is_some(),
            "Account registered"
        );

        Ok(Outcome::Registered { account, redirect })
    }

    fn redirect(
        &self,
        account: &Account,
        ctx: &RequestContext<'_>,
    ) -> Result<Option<Url>, RegistrationError> {
        let auth_new_user = self
            .extensions
            .iter()
            .fold(self.config.registration.auth_new_user, |current, ext| {
                ext.auth_new_user(current, account)
            });
        if !auth_new_user {
            return Ok(None);
        }

        ctx.auth.login(account.id).map_err(|e| RegistrationError::UnexpectedFault {
            message: e.to_string().into(),
            context: Some("Logging in the new account".into()),
        })?;

        let candidate = self
            .extensions
            .iter()
            .fold(self.redirects.default_destination().to_string(), |current, ext| {
                ext.redirect_url(current, account)
            });
        Ok(Some(self.redirects.validate(&candidate)))
    }

    fn reject(&self, form: &FormData, ctx: &RequestContext<'_>, error: &RegistrationError) {
        match error {
            RegistrationError::ValidationFailure { failures, .. } => {
                warn!(code = error.code(), failures = %failures, "Registration rejected");
            },
            RegistrationError::UnexpectedFault { .. } => {
                error!(code = error.code(), error = %error, "Registration failed unexpectedly");
            },
            _ => warn!(code = error.code(), error = %error, "Registration rejected"),
        }

        for message in error.notices() {
            ctx.notices.add_notice(&message, Severity::Error);
        }

        if error.replays_form() {
            // Re-extracted from the raw form: a fault may precede extraction.
            let submission = RegistrationSubmission::from_form(form);
            for (key, value) in submission.session_entries() {
                ctx.session.put(&key, value);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Cow<'static, str> {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        Cow::Borrowed(message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        Cow::Owned(message.clone())
    } else {
        Cow::Borrowed("Unexpected error during registration.")
    }
}
