use axum::{routing::get, Router};

use crate::api::state::AppState;

use super::handlers;

/// Public service endpoints: health and API documentation.
pub fn v1_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router())
}
