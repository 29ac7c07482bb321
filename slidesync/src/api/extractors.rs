use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;

use crate::error::SlideSyncError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(SlideSyncError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for SlideSyncError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

fn map_json_rejection(rejection: JsonRejection) -> SlideSyncError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let message = err.body_text();
            if let Some(field) = extract_missing_field(&message) {
                SlideSyncError::Validation(format!("Missing required field: {field}"))
            } else {
                SlideSyncError::Validation(format!("Invalid JSON: {message}"))
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            SlideSyncError::Validation(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => SlideSyncError::Validation(
            "Missing `Content-Type: application/json` header".to_string(),
        ),
        JsonRejection::BytesRejection(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            SlideSyncError::PayloadTooLarge(err.body_text())
        }
        JsonRejection::BytesRejection(_) => {
            SlideSyncError::Internal("Failed to read request body".to_string())
        }
        _ => SlideSyncError::Validation(rejection.body_text()),
    }
}

fn extract_missing_field(message: &str) -> Option<&str> {
    let prefix = "missing field `";
    let start = message.find(prefix)? + prefix.len();
    let remaining = message.get(start..)?;
    let end = remaining.find('`')?;
    remaining.get(..end)
}
