//! Stable string identifiers shared by every slice.

/// Role slug for learners.
pub const STUDENT: &str = "student";
/// Role slug for course authors.
pub const INSTRUCTOR: &str = "instructor";
/// Role slug for site administrators.
pub const ADMINISTRATOR: &str = "administrator";

/// Marker field that identifies a registration form submission.
pub const REGISTRATION_MARKER: &str = "masteriyo-registration";
/// Form field carrying the CSRF nonce.
pub const NONCE_FIELD: &str = "_nonce";
/// Nonce action bound to the registration form.
pub const REGISTER_ACTION: &str = "lms-register";
/// Session key prefix used to replay a rejected registration form.
pub const REGISTRATION_SESSION_PREFIX: &str = "user-registration";

/// Fragment appended to the account page for the post-registration redirect.
pub const DASHBOARD_FRAGMENT: &str = "/#/dashboard";

/// Default queue (group) name for deferred notification jobs.
pub const NOTIFICATION_QUEUE: &str = "lms";
/// Prefix of every notification schedule handle.
pub const SCHEDULE_HANDLE_PREFIX: &str = "lms/email";

/// `OpenAPI` tags.
pub const SYSTEM_TAG: &str = "System";
pub const ACCOUNT_TAG: &str = "Account";
