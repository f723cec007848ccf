use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lms::kernel::security::NonceError;
use lms::kernel::server::ApiStateError;
use serde_json::json;
use std::borrow::Cow;

/// Failures of the HTTP layer itself. Registration outcomes are not errors here.
#[lms_derive::lms_error]
pub enum ServerError {
    #[error("State error{}: {source}", format_context(.context))]
    State { source: ApiStateError, context: Option<Cow<'static, str>> },

    #[error("Nonce error{}: {source}", format_context(.context))]
    Nonce { source: NonceError, context: Option<Cow<'static, str>> },
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        let body = json!({ "error": "An internal error occurred", "code": "INTERNAL_ERROR" });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
