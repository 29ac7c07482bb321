use std::sync::Arc;

use crate::config::Config;
use crate::ocr::{OcrProvider, SlideProcessor};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Vision backend, reported by the health endpoint.
    pub ocr: OcrProvider,
    pub processor: SlideProcessor,
}

impl AppState {
    pub fn new(config: Config, ocr: OcrProvider) -> Self {
        let processor = SlideProcessor::new(Arc::new(ocr.clone()), &config.ocr);

        Self {
            config: Arc::new(config),
            ocr,
            processor,
        }
    }

    /// Swap the processor, e.g. for one backed by a different extractor.
    pub fn with_processor(mut self, processor: SlideProcessor) -> Self {
        self.processor = processor;
        self
    }
}
