use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use crate::api::slides;
use crate::ocr::ExtractionResult;

use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SlideSync API",
        version = "1.0.0",
        description = "Whiteboard and slide capture: image normalization and chunked text extraction.",
    ),
    paths(
        handlers::health::health_check,
        slides::process_slide,
        slides::upload_image,
    ),
    components(schemas(
        ExtractionResult,
        slides::ProcessSlideRequest,
        slides::UploadImageForm,
        slides::ErrorBody,
        handlers::health::HealthData,
        handlers::health::OcrStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "slides", description = "Capture processing and text extraction"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

/// Registers the bearer scheme; enforced only when API keys are configured.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_slide_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/process-slide"));
        assert!(doc.paths.paths.contains_key("/upload-image"));
        assert!(doc.paths.paths.contains_key("/api/v1/health"));
    }
}
