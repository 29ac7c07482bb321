use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::error::{Result, SlideSyncError};

/// Encode `img` as a `data:image/jpeg;base64,...` URI for the capture page.
///
/// JPEG has no alpha or 16-bit support, so the image is flattened to RGB8
/// first.
pub fn encode_preview(img: &DynamicImage, quality: u8) -> Result<String> {
    let rgb = img.to_rgb8();
    let mut output = Vec::new();
    JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| SlideSyncError::Processing(format!("Failed to encode preview: {e}")))?;

    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(&output)))
}

/// Data URI over undecodable upload bytes, when they at least look like an
/// image format a browser may still render.
pub fn raw_preview(bytes: &[u8]) -> Option<String> {
    let kind = infer::get(bytes)?;
    if kind.matcher_type() != infer::MatcherType::Image {
        return None;
    }
    Some(format!(
        "data:{};base64,{}",
        kind.mime_type(),
        STANDARD.encode(bytes)
    ))
}
