#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, ImageFormat, Rgb, RgbImage};
use slidesync::config::OcrConfig;
use slidesync::ocr::{Extraction, SlideProcessor, TextExtractor};
use tokio::time::Instant;

/// One request seen by [`RecordingExtractor`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub width: u32,
    pub height: u32,
    pub at: Instant,
    /// Every pixel is either 0 or 255.
    pub binary: bool,
}

/// Extractor double that replays scripted outcomes and records each call.
/// Once the script runs out every call returns `Extraction::Empty`.
pub struct RecordingExtractor {
    script: Mutex<VecDeque<Extraction>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingExtractor {
    pub fn new(script: impl IntoIterator<Item = Extraction>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Every call comes back empty.
    pub fn silent() -> Arc<Self> {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextExtractor for RecordingExtractor {
    async fn extract(&self, image: &GrayImage) -> Extraction {
        self.calls.lock().unwrap().push(RecordedCall {
            width: image.width(),
            height: image.height(),
            at: Instant::now(),
            binary: image.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255),
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Extraction::Empty)
    }
}

pub fn text(s: &str) -> Extraction {
    Extraction::Text(s.to_string())
}

pub fn failed(reason: &str) -> Extraction {
    Extraction::Failed {
        reason: reason.to_string(),
    }
}

/// Processor with the production pacing defaults (1s between chunks, 2s
/// after a failure).
pub fn processor_with(extractor: Arc<dyn TextExtractor>) -> SlideProcessor {
    SlideProcessor::new(extractor, &OcrConfig::default())
}

/// Light background with dark horizontal bars, roughly what a slide photo
/// binarizes to.
pub fn slide_image(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |_, y| {
        if (y / 20) % 3 == 0 {
            Rgb([30, 30, 40])
        } else {
            Rgb([225, 228, 230])
        }
    });
    DynamicImage::ImageRgb8(img)
}

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), format)
        .expect("Failed to encode test image");
    out
}

/// Assert `actual` is `expected`, allowing for timer wheel rounding.
pub fn assert_gap(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(50),
        "expected a gap of ~{expected:?}, got {actual:?}"
    );
}
