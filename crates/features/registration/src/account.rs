//! Account creation collaborator.

use crate::submission::RegistrationSubmission;
use lms_domain::ids::UserId;
use lms_domain::roles::Role;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

#[lms_derive::lms_error]
pub enum AccountError {
    /// The provider refused the data (duplicate email, taken username, weak password).
    #[error("Account rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The provider could not be reached or failed internally.
    #[error("Identity provider unavailable{}: {message}", format_context(.context))]
    Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Data handed to the identity provider. Blank `username` or `password` ask the
/// provider to generate one.
#[derive(Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("role", &self.role)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

impl NewAccount {
    #[must_use]
    pub fn from_submission(submission: RegistrationSubmission, role: Role) -> Self {
        Self {
            email: submission.email,
            username: submission.username,
            password: submission.password,
            role,
            first_name: submission.first_name,
            last_name: submission.last_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
}

pub trait IdentityProvider: Send + Sync {
    /// Creates the account.
    ///
    /// # Errors
    /// [`AccountError::Rejected`] when the data is refused, [`AccountError::Unavailable`]
    /// when the provider itself failed.
    fn create_account(&self, account: NewAccount) -> Result<Account, AccountError>;
}
