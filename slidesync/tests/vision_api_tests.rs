use std::sync::Arc;

use image::GrayImage;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use slidesync::config::OcrConfig;
use slidesync::error::SlideSyncError;
use slidesync::ocr::{
    Extraction, OcrProvider, SlideProcessor, TextExtractor, VisionClient, FALLBACK_TEXT,
    OCR_INSTRUCTION,
};

mod common;
use common::slide_image;

fn ocr_config(base_url: String) -> OcrConfig {
    OcrConfig {
        model: "openai/gpt-4o-mini".to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url),
        chunk_delay_ms: 0,
        failure_backoff_ms: 0,
        ..OcrConfig::default()
    }
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    image::DynamicImage::ImageLuma8(GrayImage::new(width, height))
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

#[tokio::test]
async fn sends_deterministic_vision_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "temperature": 0.0,
            "max_tokens": 1024,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("  HELLO \n")))
        .expect(1)
        .mount(&server)
        .await;

    let client = VisionClient::new(&ocr_config(format!("{}/v1", server.uri()))).unwrap();
    let text = client.ocr(&png(8, 8)).await.unwrap();
    assert_eq!(text.as_deref(), Some("HELLO"));

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], OCR_INSTRUCTION);
    let url = body["messages"][1]["content"][0]["image_url"]["url"]
        .as_str()
        .unwrap();
    assert!(url.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn server_error_is_a_single_failed_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream failure"))
        .expect(1)
        .mount(&server)
        .await;

    let config = ocr_config(format!("{}/v1", server.uri()));
    let client = VisionClient::new(&config).unwrap();
    let err = client.ocr(&png(4, 4)).await.unwrap_err();
    assert!(matches!(err, SlideSyncError::Ocr(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn provider_folds_outcomes_into_extraction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("   ")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Agenda")))
        .mount(&server)
        .await;

    let provider = OcrProvider::new(&ocr_config(format!("{}/v1", server.uri())));
    assert!(provider.is_available());

    let chunk = GrayImage::new(16, 16);
    assert!(provider.extract(&chunk).await.is_failure());
    assert_eq!(provider.extract(&chunk).await, Extraction::Empty);
    assert_eq!(
        provider.extract(&chunk).await,
        Extraction::Text("Agenda".to_string())
    );
}

#[tokio::test]
async fn hello_slide_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("HELLO\n")))
        .expect(1)
        .mount(&server)
        .await;

    let config = ocr_config(format!("{}/v1", server.uri()));
    let processor = SlideProcessor::new(Arc::new(OcrProvider::new(&config)), &config);

    let result = processor.process(&slide_image(500, 500)).await;

    assert!(result.success);
    assert_eq!(result.text, "HELLO");
    assert!(result.processed_image.starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn large_slide_joins_chunk_texts_in_order() {
    let server = MockServer::start().await;
    for (index, content) in ["Title", "", "Left column", "Right column"].iter().enumerate() {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
            .up_to_n_times(1)
            .with_priority((index + 1) as u8)
            .mount(&server)
            .await;
    }

    let config = ocr_config(format!("{}/v1", server.uri()));
    let processor = SlideProcessor::new(Arc::new(OcrProvider::new(&config)), &config);

    let result = processor.process(&slide_image(1200, 1200)).await;

    assert_eq!(result.text, "Title\n\nLeft column\n\nRight column");
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn unreachable_endpoint_falls_back() {
    // Nothing listens on the discard port.
    let config = ocr_config("http://127.0.0.1:9/v1".to_string());
    let processor = SlideProcessor::new(Arc::new(OcrProvider::new(&config)), &config);

    let result = processor.process(&slide_image(200, 100)).await;

    assert!(result.success);
    assert_eq!(result.text, FALLBACK_TEXT);
}
