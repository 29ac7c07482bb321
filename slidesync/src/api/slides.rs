//! Slide capture handlers.
//!
//! Both routes answer with a bare [`ExtractionResult`]. Request-level
//! problems (bad base64, missing file part) are `400` with
//! `{ "success": false, "error": "..." }`; everything after decoding is
//! folded into the result itself.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use tracing::debug;

use crate::api::extractors::AppJson;
use crate::api::state::AppState;
use crate::error::{Result, SlideSyncError};
use crate::ocr::ExtractionResult;

/// Camera capture from the browser.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ProcessSlideRequest {
    /// `data:image/...;base64,...` URI or bare base64.
    pub image: String,
}

/// Multipart form accepted by `/upload-image`.
#[derive(utoipa::ToSchema)]
pub struct UploadImageForm {
    /// The photo. An empty filename is rejected.
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Error body shared by both routes.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

/// Decode the `image` field of a capture request into raw file bytes.
pub fn decode_image_payload(payload: &str) -> Result<Vec<u8>> {
    let encoded = match payload.split_once(',') {
        Some((header, data)) if header.starts_with("data:") => data,
        _ => payload,
    };

    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(SlideSyncError::Validation(
            "No image data provided".to_string(),
        ));
    }

    Ok(STANDARD.decode(compact)?)
}

fn map_multipart_error(err: MultipartError) -> SlideSyncError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        SlideSyncError::PayloadTooLarge(err.body_text())
    } else {
        SlideSyncError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/// `POST /process-slide`
#[utoipa::path(
    post,
    path = "/process-slide",
    tag = "slides",
    request_body = ProcessSlideRequest,
    responses(
        (status = 200, description = "Capture processed", body = ExtractionResult),
        (status = 400, description = "Missing or undecodable image data", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
    )
)]
pub async fn process_slide(
    State(state): State<AppState>,
    AppJson(req): AppJson<ProcessSlideRequest>,
) -> Result<Json<ExtractionResult>> {
    let bytes = decode_image_payload(&req.image)?;
    debug!(len = bytes.len(), "Received camera capture");

    Ok(Json(state.processor.process_bytes(&bytes).await))
}

/// `POST /upload-image`
///
/// Multipart form with the photo in the `image` field.
#[utoipa::path(
    post,
    path = "/upload-image",
    tag = "slides",
    request_body(content = UploadImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Upload processed", body = ExtractionResult),
        (status = 400, description = "No file part, or no selected file", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 413, description = "Upload exceeds the configured limit", body = ErrorBody),
    )
)]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractionResult>> {
    while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if file_name.is_empty() {
            return Err(SlideSyncError::Validation("No selected file".to_string()));
        }

        let bytes = field.bytes().await.map_err(map_multipart_error)?;
        debug!(file_name = %file_name, len = bytes.len(), "Received upload");

        return Ok(Json(state.processor.process_bytes(&bytes).await));
    }

    Err(SlideSyncError::Validation("No file part".to_string()))
}
