use axum::extract::DefaultBodyLimit;
use axum::{middleware, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::api_key_middleware;
use super::slides;
use super::v1;
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Capture routes keep the paths the existing capture page posts to.
    let capture = Router::new()
        .route("/process-slide", post(slides::process_slide))
        .route("/upload-image", post(slides::upload_image))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ));

    Router::new()
        .merge(capture)
        .nest("/api/v1", v1::router::v1_router())
        .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
