use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, GenericImageView, GrayImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::OcrConfig;
use crate::error::{Result, SlideSyncError};

use super::chunking::{should_split, split_quadrants};
use super::preprocessing::{normalize, resize_to_cap};
use super::preview::{encode_preview, raw_preview};
use super::provider::{Extraction, TextExtractor};

/// Returned instead of an empty string when nothing legible was found.
pub const FALLBACK_TEXT: &str =
    "Unable to extract text from this image. Try a clearer photo or a different angle.";

/// Returned when the pipeline itself broke, e.g. undecodable upload bytes.
pub const PIPELINE_ERROR_TEXT: &str =
    "Error extracting text from image. Please try again with a clearer photo.";

/// What the capture page receives for every processed photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ExtractionResult {
    /// False only when not even a preview could be produced.
    pub success: bool,
    /// `data:` URI of the capture, JPEG unless the raw upload was passed through.
    pub processed_image: String,
    /// Extracted text, or a human-readable fallback message. Never empty.
    pub text: String,
}

/// Join chunk texts in order, skipping blank ones, separated by a blank line.
pub fn join_fragments<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fragments
        .into_iter()
        .filter(|fragment| !fragment.as_ref().trim().is_empty())
        .map(|fragment| fragment.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Normalize, split, extract, join, fall back.
///
/// Extraction requests for one image are issued strictly one after another:
/// `chunk_delay` separates consecutive chunk requests and `failure_backoff`
/// follows any failed request.
#[derive(Clone)]
pub struct SlideProcessor {
    extractor: Arc<dyn TextExtractor>,
    max_image_dimension: u32,
    display_max_dimension: u32,
    chunk_delay: Duration,
    failure_backoff: Duration,
    jpeg_quality: u8,
}

impl SlideProcessor {
    pub fn new(extractor: Arc<dyn TextExtractor>, config: &OcrConfig) -> Self {
        Self {
            extractor,
            max_image_dimension: config.max_image_dimension,
            display_max_dimension: config.display_max_dimension,
            chunk_delay: Duration::from_millis(config.chunk_delay_ms),
            failure_backoff: Duration::from_millis(config.failure_backoff_ms),
            jpeg_quality: config.jpeg_quality,
        }
    }

    pub fn is_available(&self) -> bool {
        self.extractor.is_available()
    }

    /// Decode and process raw upload bytes.
    ///
    /// Undecodable bytes still get a preview when they sniff as an image
    /// format; otherwise the result reports `success: false`.
    pub async fn process_bytes(&self, bytes: &[u8]) -> ExtractionResult {
        match image::load_from_memory(bytes) {
            Ok(img) => self.process(&img).await,
            Err(e) => {
                warn!(error = %e, len = bytes.len(), "Failed to decode uploaded image");
                match raw_preview(bytes) {
                    Some(processed_image) => ExtractionResult {
                        success: true,
                        processed_image,
                        text: PIPELINE_ERROR_TEXT.to_string(),
                    },
                    None => ExtractionResult {
                        success: false,
                        processed_image: String::new(),
                        text: PIPELINE_ERROR_TEXT.to_string(),
                    },
                }
            }
        }
    }

    /// Process a decoded image. `image` is copied, never modified.
    pub async fn process(&self, image: &DynamicImage) -> ExtractionResult {
        let (width, height) = image.dimensions();
        let span = info_span!("slide_ocr", request_id = %Uuid::new_v4(), width, height);

        async move {
            let started = std::time::Instant::now();

            let (text, preview) = match self.prepare(image.clone()).await {
                Ok((working, normalized)) => {
                    let text = self.extract_text(&normalized).await;
                    (text, encode_preview(&working, self.jpeg_quality))
                }
                Err(e) => {
                    error!(error = %e, "OCR pipeline failed");
                    (PIPELINE_ERROR_TEXT.to_string(), Err(e))
                }
            };

            let processed_image = match preview {
                Ok(preview) => Some(preview),
                Err(e) => {
                    warn!(error = %e, "Preview failed, retrying from the original image");
                    encode_preview(image, self.jpeg_quality).ok()
                }
            };

            let text = match text.trim() {
                "" => FALLBACK_TEXT.to_string(),
                trimmed => trimmed.to_string(),
            };

            info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                chars = text.len(),
                preview = processed_image.is_some(),
                "Slide processed"
            );

            ExtractionResult {
                success: processed_image.is_some(),
                processed_image: processed_image.unwrap_or_default(),
                text,
            }
        }
        .instrument(span)
        .await
    }

    /// Display-resolution working copy plus its normalized OCR image, built
    /// on the blocking pool.
    async fn prepare(&self, image: DynamicImage) -> Result<(DynamicImage, GrayImage)> {
        let display_max = self.display_max_dimension;
        let ocr_max = self.max_image_dimension;

        tokio::task::spawn_blocking(move || {
            let working = resize_to_cap(&image, display_max);
            let normalized = normalize(&working, ocr_max);
            (working, normalized)
        })
        .await
        .map_err(|e| SlideSyncError::Internal(format!("Normalization task failed: {e}")))
    }

    async fn extract_text(&self, normalized: &GrayImage) -> String {
        let (width, height) = normalized.dimensions();

        if !should_split(width, height) {
            debug!(width, height, "Extracting whole image");
            let outcome = self.extract_paced(normalized).await;
            return outcome.text().unwrap_or_default().to_string();
        }

        let chunks = split_quadrants(normalized);
        debug!(width, height, chunks = chunks.len(), "Extracting in quadrants");

        let mut fragments = Vec::with_capacity(chunks.len());
        for (position, chunk) in chunks.iter().enumerate() {
            if position > 0 {
                tokio::time::sleep(self.chunk_delay).await;
            }

            let outcome = self.extract_paced(&chunk.image).await;
            debug!(
                quadrant = %chunk.quadrant,
                width = chunk.image.width(),
                height = chunk.image.height(),
                found_text = outcome.text().is_some(),
                failed = outcome.is_failure(),
                "Chunk extracted"
            );
            fragments.push(outcome.text().unwrap_or_default().to_string());
        }

        join_fragments(fragments)
    }

    async fn extract_paced(&self, image: &GrayImage) -> Extraction {
        let outcome = self.extractor.extract(image).await;
        if let Extraction::Failed { reason } = &outcome {
            warn!(reason = %reason, backoff_ms = self.failure_backoff.as_millis() as u64, "Extraction failed, backing off");
            tokio::time::sleep(self.failure_backoff).await;
        }
        outcome
    }
}
