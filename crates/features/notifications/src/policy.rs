//! Per-kind enablement and recipient resolution.

use crate::directory::RecipientDirectory;
use crate::error::NotificationError;
use lms_domain::config::AppConfig;
use lms_domain::notification::{NotificationKind, Subject};

/// Answers "may this notification go out, and to whom".
///
/// Reads only the configuration it was built with, so repeated calls agree until
/// a new policy is constructed from a changed config.
#[derive(Debug, Clone)]
pub struct NotificationPolicy {
    config: AppConfig,
}

impl NotificationPolicy {
    #[must_use]
    pub const fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Kinds absent from `email.notifications` are enabled.
    #[must_use]
    pub fn is_enabled(&self, kind: NotificationKind) -> bool {
        self.config.email.notifications.get(&kind).is_none_or(|settings| settings.enabled)
    }

    /// Resolves the addresses for `kind` about `subject`.
    ///
    /// Fixed recipients configured for the kind win. Otherwise new orders go to the
    /// admin recipients and everything else to the subject's own address.
    ///
    /// # Errors
    /// Returns [`NotificationError::Recipient`] when nothing can be resolved.
    pub fn recipients(
        &self,
        kind: NotificationKind,
        subject: Subject,
        directory: &dyn RecipientDirectory,
    ) -> Result<Vec<String>, NotificationError> {
        let settings = self.config.email.settings(kind);
        if !settings.recipients.is_empty() {
            return Ok(settings.recipients);
        }

        let resolved = match (kind, subject) {
            (NotificationKind::NewOrder, _) => self.config.email.admin_recipients.clone(),
            (_, Subject::Order(order)) => directory.order_customer_email(order).into_iter().collect(),
            (_, Subject::User(user)) => directory.user_email(user).into_iter().collect(),
        };

        if resolved.is_empty() {
            return Err(NotificationError::Recipient {
                message: format!("no address for {subject}").into(),
                context: Some(kind.id().into()),
            });
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;
    use lms_domain::config::NotificationSettings;
    use lms_domain::ids::{OrderId, UserId};

    fn config_with(kind: NotificationKind, settings: NotificationSettings) -> AppConfig {
        let mut config = AppConfig::default();
        config.email.notifications.insert(kind, settings);
        config
    }

    #[test]
    fn unlisted_kinds_are_enabled() {
        let policy = NotificationPolicy::new(AppConfig::default());
        assert!(NotificationKind::ALL.iter().all(|kind| policy.is_enabled(*kind)));
    }

    #[test]
    fn disabled_kind_stays_disabled() {
        let policy = NotificationPolicy::new(config_with(
            NotificationKind::OrderOnHold,
            NotificationSettings { enabled: false, recipients: Vec::new() },
        ));

        assert!(!policy.is_enabled(NotificationKind::OrderOnHold));
        assert_eq!(
            policy.is_enabled(NotificationKind::OrderOnHold),
            policy.is_enabled(NotificationKind::OrderOnHold)
        );
        assert!(policy.is_enabled(NotificationKind::OrderCompleted));
    }

    #[test]
    fn new_order_goes_to_admins() {
        let policy = NotificationPolicy::new(AppConfig::default());
        let directory = InMemoryDirectory::new();

        let to = policy.recipients(NotificationKind::NewOrder, Subject::Order(OrderId(1)), &directory);
        assert_eq!(to.ok(), Some(vec!["admin@localhost".to_owned()]));
    }

    #[test]
    fn configured_recipients_win() {
        let policy = NotificationPolicy::new(config_with(
            NotificationKind::StudentRegistered,
            NotificationSettings { enabled: true, recipients: vec!["desk@school.test".to_owned()] },
        ));
        let directory = InMemoryDirectory::new();
        directory.insert_user(UserId(5), "new@school.test", None);

        let to = policy
            .recipients(NotificationKind::StudentRegistered, Subject::User(UserId(5)), &directory)
            .ok();
        assert_eq!(to, Some(vec!["desk@school.test".to_owned()]));
    }

    #[test]
    fn unknown_subject_is_an_error() {
        let policy = NotificationPolicy::new(AppConfig::default());
        let directory = InMemoryDirectory::new();

        let err = policy.recipients(
            NotificationKind::PasswordReset,
            Subject::User(UserId(404)),
            &directory,
        );
        assert!(matches!(err, Err(NotificationError::Recipient { .. })));
    }
}
