use crate::account::Account;

/// Hooks third parties use to adjust what happens after an account is created.
///
/// Each method receives the value produced so far and returns the new one; the
/// pipeline folds every registered extension in registration order.
pub trait RegistrationExtension: Send + Sync {
    /// Whether the new user is logged in and redirected.
    fn auth_new_user(&self, current: bool, _account: &Account) -> bool {
        current
    }

    /// Redirect candidate. The result is still checked against the allowed hosts.
    fn redirect_url(&self, current: String, _account: &Account) -> String {
        current
    }
}
