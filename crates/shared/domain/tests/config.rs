use lms_domain::config::{AppConfig, EmailConfig, RegistrationConfig, SecurityConfig, ServerConfig};
use lms_domain::notification::NotificationKind;
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 4583);
    assert!(server.ssl.is_none());

    let registration = RegistrationConfig::default();
    assert!(!registration.generate_username);
    assert!(!registration.generate_password);
    assert!(registration.auth_new_user);

    let email = EmailConfig::default();
    assert!(!email.schedule_enabled);
    assert_eq!(email.queue, "lms");
    assert!(email.settings(NotificationKind::NewOrder).enabled);

    assert_eq!(SecurityConfig::default().session_cookie, "lms_session");
}

#[test]
fn app_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 8080 },
        "registration": {
            "generate_password": true,
            "account_page_url": "https://school.example/account",
            "allowed_redirect_hosts": ["cdn.school.example"]
        },
        "email": {
            "schedule_enabled": true,
            "notifications": {
                "password_reset": { "enabled": false },
                "new_order": { "recipients": ["sales@school.example"] }
            }
        }
    });

    let cfg: AppConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8080);
    assert!(cfg.registration.generate_password);
    assert!(cfg.registration.auth_new_user, "unset fields keep their defaults");
    assert_eq!(cfg.registration.allowed_redirect_hosts, vec!["cdn.school.example".to_owned()]);
    assert!(cfg.email.schedule_enabled);
    assert!(!cfg.email.settings(NotificationKind::PasswordReset).enabled);

    let new_order = cfg.email.settings(NotificationKind::NewOrder);
    assert!(new_order.enabled);
    assert_eq!(new_order.recipients, vec!["sales@school.example".to_owned()]);
}

#[test]
fn deref_mut_copies_on_write() {
    let original = AppConfig::default();
    let mut changed = original.clone();
    changed.email.schedule_enabled = true;

    assert!(!original.email.schedule_enabled);
    assert!(changed.email.schedule_enabled);
}

#[test]
fn default_nonce_secret_is_flagged_as_dev_only() {
    let mut security = SecurityConfig::default();
    assert!(security.uses_dev_secret());

    security.nonce_secret = "rotated-production-secret".to_owned();
    assert!(!security.uses_dev_secret());
}
