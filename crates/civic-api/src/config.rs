//! Environment-driven configuration
use std::time::Duration;

/// Default listen address, overridable with CIVIC_ADDR
const DEFAULT_ADDR: &str = "0.0.0.0:8000";

/// Runtime configuration read from the environment
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Listen address (CIVIC_ADDR)
    pub addr: String,
    /// Vision API credential (GEMINI_API_KEY); the single required
    /// secret. When absent the server still starts so /health can
    /// report the misconfiguration, but /analyze fails fast.
    pub gemini_api_key: Option<String>,
    /// Model override (GEMINI_MODEL)
    pub gemini_model: Option<String>,
    /// Endpoint override (GEMINI_BASE_URL), mainly for tests
    pub gemini_base_url: Option<String>,
    /// Vision call timeout in seconds (CIVIC_VISION_TIMEOUT_SECS)
    pub vision_timeout: Duration,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let timeout_secs = std::env::var("CIVIC_VISION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);
        Self {
            addr: std::env::var("CIVIC_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string()),
            gemini_api_key: non_empty(std::env::var("GEMINI_API_KEY").ok()),
            gemini_model: non_empty(std::env::var("GEMINI_MODEL").ok()),
            gemini_base_url: non_empty(std::env::var("GEMINI_BASE_URL").ok()),
            vision_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
