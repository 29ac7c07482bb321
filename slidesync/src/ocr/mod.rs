//! OCR (Optical Character Recognition) Module
//!
//! Turns a captured slide or whiteboard photo into plain text by way of an
//! external vision model.
//!
//! # Architecture
//!
//! The pipeline is a linear chain with one branch:
//! - `preprocessing`: resolution caps, grayscale, Otsu binarization
//! - `chunking`: quadrant split for large images
//! - `provider`: the `TextExtractor` seam and the production `OcrProvider`
//! - `api`: OpenAI-compatible chat-completions client for the vision model
//! - `aggregator`: `SlideProcessor`, which paces the extraction calls,
//!   joins the fragments and builds the `ExtractionResult`
//! - `preview`: JPEG data URI for the client
//!
//! # Configuration
//!
//! Controlled via `OcrConfig` (see `config.rs`):
//! - `model`: `provider/model` selection (e.g. "gemini/gemini-1.5-flash")
//! - `api_key`: enables the vision backend; absent means text extraction is off
//! - `max_image_dimension` / `display_max_dimension`: the two resolution caps
//! - `chunk_delay_ms` / `failure_backoff_ms`: request pacing
//!
//! # Usage
//!
//! ```rust,ignore
//! let ocr = OcrProvider::new(&config.ocr);
//! let processor = SlideProcessor::new(Arc::new(ocr), &config.ocr);
//! let result = processor.process_bytes(&upload).await;
//! ```

mod aggregator;
mod api;
mod chunking;
mod preprocessing;
mod preview;
mod provider;

pub use aggregator::{
    join_fragments, ExtractionResult, SlideProcessor, FALLBACK_TEXT, PIPELINE_ERROR_TEXT,
};
pub use api::{VisionClient, OCR_INSTRUCTION};
pub use chunking::{should_split, split_quadrants, Chunk, Quadrant, SPLIT_PIXEL_THRESHOLD};
pub use preprocessing::{binarize, normalize, otsu_threshold, resize_to_cap, scaled_dimensions};
pub use preview::{encode_preview, raw_preview};
pub use provider::{Extraction, OcrBackend, OcrProvider, TextExtractor};
