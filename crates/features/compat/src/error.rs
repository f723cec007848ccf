use std::borrow::Cow;

#[lms_derive::lms_error]
pub enum CompatError {
    /// The host refused to apply a cache rule.
    #[error("Cache host error{}: {message}", format_context(.context))]
    Host { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal compatibility error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
