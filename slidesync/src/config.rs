use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

/// Non-blank environment variable, trimmed.
fn env_non_blank(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer keys for the processing routes. Empty leaves them open.
    pub api_keys: Vec<String>,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// `provider/model`, e.g. `gemini/gemini-1.5-flash` or `openai/gpt-4o-mini`.
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Per-request timeout. `None` waits on the vision endpoint indefinitely.
    pub timeout_secs: Option<u64>,
    pub max_output_tokens: u32,
    /// Resolution cap applied during OCR normalization.
    pub max_image_dimension: u32,
    /// Resolution cap applied to the working copy before anything else.
    pub display_max_dimension: u32,
    /// Pause between consecutive chunk requests.
    pub chunk_delay_ms: u64,
    /// Pause after a failed extraction request.
    pub failure_backoff_ms: u64,
    pub jpeg_quality: u8,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            api_keys: Vec::new(),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model: "gemini/gemini-1.5-flash".to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: None,
            max_output_tokens: 1024,
            max_image_dimension: 1600,
            display_max_dimension: 2000,
            chunk_delay_ms: 1000,
            failure_backoff_ms: 2000,
            jpeg_quality: 90,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let server_defaults = ServerConfig::default();
        let ocr_defaults = OcrConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("SLIDESYNC_HOST").unwrap_or(server_defaults.host),
                port: parse_env_or("SLIDESYNC_PORT", server_defaults.port),
                api_keys: env::var("SLIDESYNC_API_KEYS")
                    .map(|keys| {
                        keys.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
                max_upload_bytes: parse_env_or(
                    "SLIDESYNC_MAX_UPLOAD_BYTES",
                    server_defaults.max_upload_bytes,
                ),
            },
            ocr: OcrConfig {
                model: env_non_blank("OCR_MODEL").unwrap_or(ocr_defaults.model),
                api_key: env_non_blank("OCR_API_KEY"),
                base_url: env_non_blank("OCR_BASE_URL"),
                timeout_secs: parse_env_opt("OCR_TIMEOUT"),
                max_output_tokens: parse_env_or("OCR_MAX_TOKENS", ocr_defaults.max_output_tokens),
                max_image_dimension: parse_env_or(
                    "OCR_MAX_DIMENSION",
                    ocr_defaults.max_image_dimension,
                ),
                display_max_dimension: parse_env_or(
                    "OCR_DISPLAY_MAX_DIMENSION",
                    ocr_defaults.display_max_dimension,
                ),
                chunk_delay_ms: parse_env_or("OCR_CHUNK_DELAY_MS", ocr_defaults.chunk_delay_ms),
                failure_backoff_ms: parse_env_or(
                    "OCR_FAILURE_BACKOFF_MS",
                    ocr_defaults.failure_backoff_ms,
                ),
                jpeg_quality: parse_env_or("OCR_PREVIEW_QUALITY", ocr_defaults.jpeg_quality)
                    .clamp(1, 100),
            },
        }
    }
}

/// Vision providers that speak the OpenAI chat-completions dialect.
pub const KNOWN_OCR_PROVIDERS: &[&str] = &["openai", "gemini", "openrouter", "cerebras"];

/// Parse an OCR model name into (provider, model) tuple.
///
/// Unknown prefixes are kept as part of the model name and reported under
/// the `custom` provider, which requires `OCR_BASE_URL`.
pub fn parse_ocr_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_OCR_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    ("custom", model)
}

/// Default chat-completions base URL for a known provider.
pub fn default_base_url(provider: &str) -> Option<&'static str> {
    match provider.to_lowercase().as_str() {
        "openai" => Some("https://api.openai.com/v1"),
        "gemini" => Some("https://generativelanguage.googleapis.com/v1beta/openai"),
        "openrouter" => Some("https://openrouter.ai/api/v1"),
        "cerebras" => Some("https://api.cerebras.ai/v1"),
        _ => None,
    }
}
