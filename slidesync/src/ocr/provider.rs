use std::io::Cursor;

use async_trait::async_trait;
use image::{GrayImage, ImageFormat};
use tracing::{debug, info, warn};

use crate::config::OcrConfig;
use crate::error::{Result, SlideSyncError};

use super::api::VisionClient;

/// Outcome of one extraction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Trimmed, non-empty text.
    Text(String),
    /// Nothing legible, or no backend to ask.
    Empty,
    /// The request itself failed. Contributes nothing, like `Empty`, but
    /// the caller backs off before its next request.
    Failed { reason: String },
}

impl Extraction {
    pub fn text(&self) -> Option<&str> {
        match self {
            Extraction::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Extraction::Failed { .. })
    }
}

/// Reads text out of one normalized image or chunk.
///
/// Implementations never error: every failure mode is folded into
/// [`Extraction`].
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, image: &GrayImage) -> Extraction;

    fn is_available(&self) -> bool {
        true
    }
}

#[derive(Clone, Debug)]
pub enum OcrBackend {
    Api { client: VisionClient },
    Unavailable { reason: String },
}

/// Production extractor. The backend is fixed at construction for the
/// lifetime of the process.
#[derive(Clone, Debug)]
pub struct OcrProvider {
    backend: OcrBackend,
}

fn encode_png(image: &GrayImage) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| SlideSyncError::Processing(format!("Failed to encode chunk: {e}")))?;
    Ok(output)
}

impl OcrProvider {
    pub fn new(config: &OcrConfig) -> Self {
        if config.api_key.is_none() {
            let reason = "No OCR API key configured".to_string();
            warn!("{}", reason);
            return Self::unavailable(&reason);
        }

        match VisionClient::new(config) {
            Ok(client) => {
                info!(
                    provider = client.provider(),
                    model = client.model(),
                    "Vision OCR backend initialized"
                );
                Self {
                    backend: OcrBackend::Api { client },
                }
            }
            Err(e) => {
                let reason = format!("Vision OCR backend unavailable: {e}");
                warn!("{}", reason);
                Self::unavailable(&reason)
            }
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: OcrBackend::Unavailable {
                reason: reason.to_string(),
            },
        }
    }

    pub fn backend(&self) -> &OcrBackend {
        &self.backend
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, OcrBackend::Unavailable { .. })
    }
}

#[async_trait]
impl TextExtractor for OcrProvider {
    async fn extract(&self, image: &GrayImage) -> Extraction {
        let client = match &self.backend {
            OcrBackend::Api { client } => client,
            OcrBackend::Unavailable { reason } => {
                debug!(reason = %reason, "Skipping extraction, OCR unavailable");
                return Extraction::Empty;
            }
        };

        if image.width() == 0 || image.height() == 0 {
            return Extraction::Empty;
        }

        let png = match encode_png(image) {
            Ok(png) => png,
            Err(e) => {
                warn!(error = %e, "Could not encode image for extraction");
                return Extraction::Failed {
                    reason: e.to_string(),
                };
            }
        };

        match client.ocr(&png).await {
            Ok(Some(text)) => Extraction::Text(text),
            Ok(None) => Extraction::Empty,
            Err(e) => {
                warn!(error = %e, "Vision OCR request failed");
                Extraction::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn is_available(&self) -> bool {
        OcrProvider::is_available(self)
    }
}
