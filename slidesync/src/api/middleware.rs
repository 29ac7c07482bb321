//! # Bearer Key Authentication Middleware
//!
//! Guards the slide processing routes when `SLIDESYNC_API_KEYS` is set.
//! With no keys configured the routes are open, matching a single-user
//! deployment behind the capture page.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;
use crate::error::SlideSyncError;

/// Axum middleware enforcing `Authorization: Bearer <token>`.
///
/// # Behavior
///
/// - No keys configured → request passes through.
/// - Header missing or not a Bearer token → 401.
/// - Token not in the configured key list → 401.
///
/// Errors use the same `{ "success": false, "error": "..." }` body as the
/// processing routes.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let keys = &state.config.server.api_keys;
    if keys.is_empty() {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(token) => token,
            None => {
                return SlideSyncError::ApiAuth(
                    "Invalid authorization header format. Expected: Bearer <token>".to_string(),
                )
                .into_response();
            }
        },
        None => {
            return SlideSyncError::ApiAuth("Missing authorization header".to_string())
                .into_response();
        }
    };

    if keys.iter().any(|key| key == token) {
        next.run(request).await
    } else {
        tracing::debug!("Rejected request with unknown API key");
        SlideSyncError::ApiAuth("Invalid API key".to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, OcrConfig, ServerConfig};
    use crate::ocr::OcrProvider;
    use axum::http::StatusCode;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    fn build_test_app(api_keys: Vec<String>) -> Router {
        let config = Config {
            server: ServerConfig {
                api_keys,
                ..ServerConfig::default()
            },
            ocr: OcrConfig::default(),
        };
        let state = AppState::new(config, OcrProvider::unavailable("test"));

        async fn protected_handler() -> &'static str {
            "protected"
        }

        Router::new()
            .route("/protected", get(protected_handler))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                api_key_middleware,
            ))
            .with_state(state)
    }

    async fn parse_error_body(response: Response) -> (StatusCode, serde_json::Value) {
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (status, json)
    }

    fn get_protected(auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/protected");
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_open_when_no_keys_configured() {
        let app = build_test_app(vec![]);
        let response = app.oneshot(get_protected(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_allows_valid_key() {
        let app = build_test_app(vec!["k1".to_string(), "k2".to_string()]);
        let response = app.oneshot(get_protected(Some("Bearer k2"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejects_invalid_key() {
        let app = build_test_app(vec!["k1".to_string()]);
        let response = app
            .oneshot(get_protected(Some("Bearer wrong")))
            .await
            .unwrap();

        let (status, json) = parse_error_body(response).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Invalid API key");
    }

    #[tokio::test]
    async fn test_rejects_missing_header() {
        let app = build_test_app(vec!["k1".to_string()]);
        let response = app.oneshot(get_protected(None)).await.unwrap();

        let (status, json) = parse_error_body(response).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Missing authorization header");
    }

    #[tokio::test]
    async fn test_rejects_non_bearer_scheme() {
        let app = build_test_app(vec!["k1".to_string()]);
        let response = app
            .oneshot(get_protected(Some("Basic azE6")))
            .await
            .unwrap();

        let (status, json) = parse_error_body(response).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("Expected: Bearer <token>"));
    }
}
