//! `/account` routes: registration form intake and its nonce.

use crate::error::ServerError;
use crate::session::Sessions;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Form, Json};
use axum_extra::extract::cookie::CookieJar;
use lms::domain::constants::{ACCOUNT_TAG, REGISTER_ACTION};
use lms::domain::notification::Severity;
use lms::features::registration::{
    FormData, Notice, NoticeLog, Outcome, Registration, RegistrationError, RequestContext,
};
use lms::kernel::server::ApiState;
use lms_derive::{api_handler, api_model};
use std::collections::BTreeMap;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub(crate) fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(nonce_handler)).routes(routes!(register_handler))
}

#[api_model(rename_all = "kebab-case")]
/// Registration form fields, posted urlencoded
#[allow(dead_code)]
pub(crate) struct RegisterForm {
    /// Marker identifying the registration form; any value
    masteriyo_registration: String,
    /// Nonce from `GET /account/nonce`
    #[serde(rename = "_nonce")]
    nonce: String,
    first_name: String,
    last_name: String,
    username: Option<String>,
    email: String,
    password: Option<String>,
    confirm_password: Option<String>,
}

#[api_model]
/// Nonce for the registration form plus the values of the last rejected attempt
pub(crate) struct NonceResponse {
    nonce: String,
    /// Form field name to value. Emptied once read.
    replay: BTreeMap<String, String>,
}

#[api_model]
/// Message for the visitor
pub(crate) struct NoticeView {
    message: String,
    /// `info` or `error`
    severity: String,
}

impl From<Notice> for NoticeView {
    fn from(notice: Notice) -> Self {
        let severity = match notice.severity {
            Severity::Info => "info",
            Severity::Error => "error",
        };
        Self { message: notice.message, severity: severity.to_owned() }
    }
}

#[api_model]
/// Result of a registration attempt
pub(crate) struct RegisterResponse {
    /// `registered` or `rejected`
    status: String,
    user_id: Option<u64>,
    redirect: Option<String>,
    notices: Vec<NoticeView>,
}

#[api_handler(
    get,
    path = "/account/nonce",
    responses((status = OK, description = "Nonce bound to the session cookie", body = NonceResponse)),
    tag = ACCOUNT_TAG,
)]
pub(crate) async fn nonce_handler(
    Extension(sessions): Extension<Sessions>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<NonceResponse>), ServerError> {
    let (jar, session) = sessions.resolve(jar);
    let nonce = session.nonce(REGISTER_ACTION)?;
    let replay = session.data().take_replay();
    Ok((jar, Json(NonceResponse { nonce, replay })))
}

#[api_handler(
    post,
    path = "/account/register",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = SEE_OTHER, description = "Registered and logged in; `Location` holds the redirect", body = RegisterResponse),
        (status = CREATED, description = "Registered without login", body = RegisterResponse),
        (status = NO_CONTENT, description = "Not a registration form"),
        (status = FORBIDDEN, description = "Missing or invalid nonce", body = RegisterResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Validation or account creation failed", body = RegisterResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Unexpected fault", body = RegisterResponse),
    ),
    tag = ACCOUNT_TAG,
)]
pub(crate) async fn register_handler(
    State(state): State<ApiState>,
    Extension(sessions): Extension<Sessions>,
    jar: CookieJar,
    Form(form): Form<FormData>,
) -> Result<Response, ServerError> {
    let registration = state.try_get_slice::<Registration>()?;
    let (jar, session) = sessions.resolve(jar);
    let notices = NoticeLog::new();
    let ctx = RequestContext { nonces: &session, session: &session, notices: &notices, auth: &session };

    let outcome = registration.pipeline.process(&form, &ctx);
    let notices: Vec<NoticeView> = notices.take().into_iter().map(NoticeView::from).collect();

    let response = match outcome {
        Outcome::Ignored => StatusCode::NO_CONTENT.into_response(),
        Outcome::Registered { account, redirect } => {
            let body = RegisterResponse {
                status: "registered".to_owned(),
                user_id: Some(account.id.get()),
                redirect: redirect.as_ref().map(ToString::to_string),
                notices,
            };
            match redirect {
                Some(url) => {
                    (StatusCode::SEE_OTHER, [(header::LOCATION, url.to_string())], Json(body))
                        .into_response()
                },
                None => (StatusCode::CREATED, Json(body)).into_response(),
            }
        },
        Outcome::Rejected(error) => {
            let body = RegisterResponse {
                status: "rejected".to_owned(),
                user_id: None,
                redirect: None,
                notices,
            };
            (rejection_status(&error), Json(body)).into_response()
        },
    };

    Ok((jar, response).into_response())
}

const fn rejection_status(error: &RegistrationError) -> StatusCode {
    match error {
        RegistrationError::MissingToken { .. } | RegistrationError::InvalidToken { .. } => {
            StatusCode::FORBIDDEN
        },
        RegistrationError::ValidationFailure { .. }
        | RegistrationError::AccountCreationFailure { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        RegistrationError::Config { .. } | RegistrationError::UnexpectedFault { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        },
    }
}
