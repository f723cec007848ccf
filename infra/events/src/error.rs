use std::borrow::Cow;

/// Failures recorded while dispatching an event.
///
/// The router never returns these from `dispatch`; they are collected into the
/// [`DispatchReport`](crate::DispatchReport) so one handler cannot stop the others.
#[lms_derive::lms_error]
pub enum EventBusError {
    /// The handler returned an error.
    #[error("Handler error{}: {message}", format_context(.context))]
    Handler { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The handler panicked; the payload message is preserved when it is a string.
    #[error("Handler panicked{}: {message}", format_context(.context))]
    Panicked { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
