use super::ApiState;
use axum::extract::State;
use axum::http::header;
use axum::{Json, response::IntoResponse};
use lms_derive::{api_handler, api_model};
use lms_domain::constants::SYSTEM_TAG;
use std::sync::LazyLock;
use std::time::Instant;

static STARTED: LazyLock<Instant> = LazyLock::new(Instant::now);

#[api_model]
/// Liveness report
pub(super) struct HealthResponse {
    /// Always `up` while the process answers
    status: &'static str,
    version: &'static str,
    /// Seconds since the first health probe
    uptime: u64,
    /// Registered feature slices, sorted
    slices: Vec<String>,
}

#[api_handler(
    get,
    path = "/health",
    responses((status = OK, description = "Process is up", body = HealthResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let mut slices: Vec<String> = state.slice_names().map(str::to_owned).collect();
    slices.sort_unstable();

    let body = HealthResponse {
        status: "up",
        version: env!("CARGO_PKG_VERSION"),
        uptime: STARTED.elapsed().as_secs(),
        slices,
    };

    ([(header::CACHE_CONTROL, "no-store")], Json(body))
}
