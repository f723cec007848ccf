use std::borrow::Cow;

/// A specialized [`NotificationError`] enum of this crate.
#[lms_derive::lms_error]
pub enum NotificationError {
    /// No address could be resolved for the notification subject.
    #[error("Notification recipient error{}: {message}", format_context(.context))]
    Recipient { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The job payload is missing its subject id or is malformed.
    #[error("Notification payload error{}: {message}", format_context(.context))]
    Payload { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The mailer refused or failed to send.
    #[error("Notification delivery error{}: {message}", format_context(.context))]
    Delivery { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// No notification is registered for the kind or schedule handle.
    #[error("Unknown notification{}: {message}", format_context(.context))]
    Unknown { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal notification error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
