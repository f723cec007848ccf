use crate::constants::NOTIFICATION_QUEUE;
use crate::notification::NotificationKind;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level configuration shared across slices.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub registration: RegistrationConfig,
    pub email: EmailConfig,
    pub enrollment: EnrollmentConfig,
    pub log: LogConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Default nonce secret. Only fit for local development.
pub const DEV_NONCE_SECRET: &str = "dev-only-change-me";

/// Sessions and CSRF nonces.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Secret mixed into every nonce digest. Must be overridden in production.
    pub nonce_secret: String,
    pub session_cookie: String,
    pub session_ttl_seconds: u64,
    pub session_cache_capacity: u64,
}

/// Registration form behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Derive the username from the email when the form omits it.
    pub generate_username: bool,
    /// Generate a password and mail it instead of asking for one.
    pub generate_password: bool,
    /// Log new users in and redirect them to the dashboard.
    pub auth_new_user: bool,
    /// Absolute URL of the account page; the dashboard redirect is built from it.
    pub account_page_url: String,
    /// Extra hosts a redirect may point at, besides the account page host.
    pub allowed_redirect_hosts: Vec<String>,
}

/// Email notification settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Hand notifications to the deferred queue instead of sending inline.
    pub schedule_enabled: bool,
    /// Queue (group) name for deferred jobs.
    pub queue: String,
    pub queue_capacity: usize,
    pub from_address: String,
    /// Recipients of admin-facing notifications such as new orders.
    pub admin_recipients: Vec<String>,
    /// Per-kind overrides. Kinds not listed use [`NotificationSettings::default`].
    pub notifications: BTreeMap<NotificationKind, NotificationSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub enabled: bool,
    /// Fixed recipients. Empty means "resolve from the subject".
    pub recipients: Vec<String>,
}

/// Enrollment housekeeping.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrollmentConfig {
    pub delete_on_course_deletion: bool,
}

/// Logging output for the binaries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub filter: Option<String>,
    pub console: bool,
    pub directory: Option<PathBuf>,
    pub json: bool,
    pub max_files: usize,
}

impl EmailConfig {
    /// Settings for `kind`, falling back to defaults.
    #[must_use]
    pub fn settings(&self, kind: NotificationKind) -> NotificationSettings {
        self.notifications.get(&kind).cloned().unwrap_or_default()
    }
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 4583, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            nonce_secret: DEV_NONCE_SECRET.to_owned(),
            session_cookie: "lms_session".to_owned(),
            session_ttl_seconds: 86_400,
            session_cache_capacity: 10_000,
        }
    }
}

impl SecurityConfig {
    /// Whether the nonce secret was left at [`DEV_NONCE_SECRET`].
    #[must_use]
    pub fn uses_dev_secret(&self) -> bool {
        self.nonce_secret == DEV_NONCE_SECRET
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            generate_username: false,
            generate_password: false,
            auth_new_user: true,
            account_page_url: "http://localhost:4583/account".to_owned(),
            allowed_redirect_hosts: Vec::new(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            schedule_enabled: false,
            queue: NOTIFICATION_QUEUE.to_owned(),
            queue_capacity: 1024,
            from_address: "no-reply@localhost".to_owned(),
            admin_recipients: vec!["admin@localhost".to_owned()],
            notifications: BTreeMap::new(),
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self { enabled: true, recipients: Vec::new() }
    }
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self { delete_on_course_deletion: true }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            filter: None,
            console: true,
            directory: None,
            json: false,
            max_files: 10,
        }
    }
}
