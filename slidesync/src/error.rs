use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlideSyncError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API authentication error: {0}")]
    ApiAuth(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl SlideSyncError {
    pub fn status(&self) -> StatusCode {
        match self {
            SlideSyncError::Validation(_) => StatusCode::BAD_REQUEST,
            SlideSyncError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            SlideSyncError::Base64(_) => StatusCode::BAD_REQUEST,
            SlideSyncError::Json(_) => StatusCode::BAD_REQUEST,
            SlideSyncError::Image(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SlideSyncError::ApiAuth(_) => StatusCode::UNAUTHORIZED,
            SlideSyncError::Http(_) => StatusCode::BAD_GATEWAY,
            SlideSyncError::Ocr(_) => StatusCode::BAD_GATEWAY,
            SlideSyncError::OcrUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SlideSyncError::Processing(_)
            | SlideSyncError::Io(_)
            | SlideSyncError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SlideSyncError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            SlideSyncError::Validation(msg)
            | SlideSyncError::PayloadTooLarge(msg)
            | SlideSyncError::ApiAuth(msg) => msg.clone(),
            SlideSyncError::Base64(e) => format!("Invalid base64 image data: {e}"),
            SlideSyncError::Json(e) => format!("Invalid JSON: {e}"),
            SlideSyncError::Image(e) => format!("Invalid image: {e}"),
            other => {
                tracing::error!(error = %other, "Request failed");
                "An internal error occurred".to_string()
            }
        };

        // Same shape the capture page already reads: `success` plus `error`.
        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, SlideSyncError>;
