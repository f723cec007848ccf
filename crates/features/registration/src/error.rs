use crate::validation::ValidationResult;
use std::borrow::Cow;

/// Why a registration attempt did not produce a logged-in account.
///
/// Validation and account-creation failures have the same visible effect (notices
/// plus form replay) but stay separate variants so logs show the real cause.
#[lms_derive::lms_error]
pub enum RegistrationError {
    /// The `_nonce` field was absent or blank.
    #[error("Registration token missing{}: {message}", format_context(.context))]
    MissingToken { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The `_nonce` field did not verify for the registration action.
    #[error("Registration token invalid{}: {message}", format_context(.context))]
    InvalidToken { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Registration validation failed{}: {failures}", format_context(.context))]
    ValidationFailure { failures: ValidationResult, context: Option<Cow<'static, str>> },

    /// The identity provider refused to create the account.
    #[error("Account creation failed{}: {message}", format_context(.context))]
    AccountCreationFailure { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The registration settings cannot be used (for example an unparsable account URL).
    #[error("Registration config error{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Anything else, including panics inside collaborators or extensions.
    #[error("Unexpected registration fault{}: {message}", format_context(.context))]
    UnexpectedFault { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl RegistrationError {
    /// Stable short name for logs.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingToken { .. } => "missing_token",
            Self::InvalidToken { .. } => "invalid_token",
            Self::ValidationFailure { .. } => "validation_failure",
            Self::AccountCreationFailure { .. } => "account_creation_failure",
            Self::Config { .. } => "config",
            Self::UnexpectedFault { .. } => "unexpected_fault",
        }
    }

    /// Messages shown to the visitor, one notice each.
    #[must_use]
    pub fn notices(&self) -> Vec<String> {
        match self {
            Self::ValidationFailure { failures, .. } => {
                failures.messages().map(str::to_owned).collect()
            },
            Self::MissingToken { message, .. }
            | Self::InvalidToken { message, .. }
            | Self::AccountCreationFailure { message, .. }
            | Self::Config { message, .. }
            | Self::UnexpectedFault { message, .. } => vec![message.to_string()],
        }
    }

    /// Token errors return before anything is written to the session.
    #[must_use]
    pub const fn replays_form(&self) -> bool {
        !matches!(self, Self::MissingToken { .. } | Self::InvalidToken { .. })
    }
}
