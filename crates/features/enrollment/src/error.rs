use std::borrow::Cow;

#[lms_derive::lms_error]
pub enum EnrollmentError {
    /// The store could not read or delete records.
    #[error("Enrollment store error{}: {message}", format_context(.context))]
    Store { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal enrollment error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
