use crate::account;
use crate::session::Sessions;
use axum::{Extension, Router};
use lms::kernel::prelude::ApiState;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(title = "LMS API", description = "Registration intake and notification dispatch"))]
struct ApiDoc;

pub(crate) fn init(state: ApiState, sessions: Sessions) -> Router {
    let api = ApiDoc::openapi();

    // Separate the OpenAPI routes and the API documentation object
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(api)
        .merge(lms::server::router::system_router())
        .merge(account::router())
        .layer(Extension(sessions))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    let scalar_routes = Scalar::with_url("/api", api_doc);

    Router::new().merge(openapi_routes).merge(scalar_routes)
}
