//! In-process collaborators for tests and single-node deployments.

use crate::account::{Account, AccountError, IdentityProvider, NewAccount};
use crate::context::{AuthSessions, CollaboratorError, NonceVerifier, NoticeSink, SessionStore};
use fxhash::FxHashMap;
use lms_domain::ids::UserId;
use lms_domain::notification::Severity;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity provider backed by a map. Emails and usernames are unique.
#[derive(Debug)]
pub struct InMemoryIdentityProvider {
    accounts: RwLock<FxHashMap<UserId, Account>>,
    next_id: AtomicU64,
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self { accounts: RwLock::default(), next_id: AtomicU64::new(1) }
    }
}

impl InMemoryIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: UserId) -> Option<Account> {
        self.accounts.read().get(&id).cloned()
    }

    #[must_use]
    pub fn find_by_email(&self, email: &str) -> Option<Account> {
        self.accounts.read().values().find(|a| a.email == email).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    fn create_account(&self, account: NewAccount) -> Result<Account, AccountError> {
        if account.email.is_empty() {
            return Err(AccountError::Rejected {
                message: "An email address is required.".into(),
                context: None,
            });
        }

        let username = if account.username.is_empty() {
            account.email.split('@').next().unwrap_or_default().to_owned()
        } else {
            account.username
        };

        let mut accounts = self.accounts.write();
        if accounts.values().any(|a| a.email == account.email) {
            return Err(AccountError::Rejected {
                message: "An account is already registered with your email address.".into(),
                context: None,
            });
        }
        if accounts.values().any(|a| a.username == username) {
            return Err(AccountError::Rejected {
                message: "An account is already registered with that username.".into(),
                context: None,
            });
        }

        let password_generated = account.password.is_empty();

        let id = UserId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let created = Account {
            id,
            email: account.email,
            username,
            role: account.role,
            first_name: account.first_name,
            last_name: account.last_name,
        };
        accounts.insert(id, created.clone());
        drop(accounts);

        tracing::debug!(user_id = %id, password_generated, "Account stored");
        Ok(created)
    }
}

/// Key/value session scratch space.
#[derive(Debug, Default)]
pub struct MemorySession {
    values: Mutex<FxHashMap<String, String>>,
}

impl MemorySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    /// Every entry, sorted by key.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<_> =
            self.values.lock().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        entries.sort();
        entries
    }
}

impl SessionStore for MemorySession {
    fn put(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_owned(), value.to_owned());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

/// Records notices in the order they were added.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn all(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    #[must_use]
    pub fn with_severity(&self, severity: Severity) -> Vec<String> {
        self.notices
            .lock()
            .iter()
            .filter(|n| n.severity == severity)
            .map(|n| n.message.clone())
            .collect()
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }
}

impl NoticeSink for NoticeLog {
    fn add_notice(&self, message: &str, severity: Severity) {
        self.notices.lock().push(Notice { message: message.to_owned(), severity });
    }
}

/// Remembers which users were logged in; optionally fails every login.
#[derive(Debug, Default)]
pub struct RecordingAuth {
    logins: Mutex<Vec<UserId>>,
    fail_with: Mutex<Option<String>>,
}

impl RecordingAuth {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn logins(&self) -> Vec<UserId> {
        self.logins.lock().clone()
    }

    pub fn fail_with(&self, message: Option<&str>) {
        *self.fail_with.lock() = message.map(str::to_owned);
    }
}

impl AuthSessions for RecordingAuth {
    fn login(&self, user: UserId) -> Result<(), CollaboratorError> {
        if let Some(reason) = self.fail_with.lock().clone() {
            return Err(reason.into());
        }
        self.logins.lock().push(user);
        Ok(())
    }
}

/// Accepts exactly one token, for any action.
#[derive(Debug, Clone)]
pub struct AcceptToken(pub String);

impl NonceVerifier for AcceptToken {
    fn verify(&self, token: &str, _action: &str) -> bool {
        token == self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_domain::roles::Role;

    fn new_account(email: &str, username: &str) -> NewAccount {
        NewAccount {
            email: email.to_owned(),
            username: username.to_owned(),
            password: String::new(),
            role: Role::Student,
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
        }
    }

    #[test]
    fn blank_username_is_derived_from_email() {
        let provider = InMemoryIdentityProvider::new();
        let account = provider.create_account(new_account("ada@school.test", "")).unwrap();
        assert_eq!(account.username, "ada");
        assert_eq!(account.id, UserId(1));
        assert_eq!(provider.get(account.id), Some(account));
    }

    #[test]
    fn duplicates_are_rejected() {
        let provider = InMemoryIdentityProvider::new();
        provider.create_account(new_account("ada@school.test", "ada")).unwrap();

        let same_email = provider.create_account(new_account("ada@school.test", "other"));
        assert!(matches!(same_email, Err(AccountError::Rejected { .. })));

        let same_username = provider.create_account(new_account("other@school.test", "ada"));
        assert!(matches!(same_username, Err(AccountError::Rejected { .. })));
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn notice_log_keeps_order() {
        let log = NoticeLog::new();
        log.add_notice("first", Severity::Error);
        log.add_notice("second", Severity::Info);
        assert_eq!(log.with_severity(Severity::Error), vec!["first"]);
        assert_eq!(log.take().len(), 2);
        assert!(log.all().is_empty());
    }

    #[test]
    fn recording_auth_can_fail() {
        let auth = RecordingAuth::new();
        auth.fail_with(Some("cookie jar full"));
        assert!(auth.login(UserId(3)).is_err());
        assert!(auth.logins().is_empty());
    }
}
