use std::path::{Path, PathBuf};

use clap::Parser;

use crate::error::Result;
use crate::ocr::{ExtractionResult, SlideProcessor};

#[derive(Debug, Parser)]
#[command(name = "slidesync")]
#[command(about = "Whiteboard and slide capture service with chunked text extraction")]
pub struct Args {
    /// Process a single image file, print the result as JSON and exit
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Indent the printed JSON
    #[arg(long, requires = "image")]
    pub pretty: bool,

    /// Leave the preview data URI out of the printed JSON
    #[arg(long, requires = "image")]
    pub no_preview: bool,
}

/// Run the pipeline on one file from disk.
///
/// Only reading the file can fail; decode and extraction problems are
/// reported inside the returned result.
pub async fn process_file(
    processor: &SlideProcessor,
    path: &Path,
    include_preview: bool,
) -> Result<ExtractionResult> {
    let bytes = tokio::fs::read(path).await?;
    tracing::info!(path = %path.display(), len = bytes.len(), "Processing image file");

    let mut result = processor.process_bytes(&bytes).await;
    if !include_preview {
        result.processed_image.clear();
    }
    Ok(result)
}

pub fn render_result(result: &ExtractionResult, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(rendered)
}
