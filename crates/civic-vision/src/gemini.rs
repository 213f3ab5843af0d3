//! Gemini provider
//!
//! Posts the image and the fixed civic-issue prompt to the Gemini
//! `generateContent` REST endpoint and runs the answer through the
//! tolerant parser.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, StatusCode, Url,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::parser::{parse_model_output, AnalysisOutcome};
use crate::{ImageAnalyzer, VisionError};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed instructional prompt sent with every image
const SYSTEM_PROMPT: &str = "\
You are an AI system that detects civic infrastructure issues from photos.

Recognized issue types: Pothole, Garbage Overflow, Water Leakage, Open Drain, Streetlight Issue.

Tasks:
1. Determine which recognized issues, if any, are visible.
2. Estimate a confidence in [0, 1] for each detection.
3. Provide concise visual reasoning.

Rules:
- Respond ONLY with a JSON object, no extra text:
  {\"civic_issues\": [\"<label>\", ...], \"detections\": [{\"label\": \"<label>\", \"confidence\": <0..1>}, ...], \"explanation\": \"<reasoning>\"}
- If the image is unclear or unrelated, return empty civic_issues and detections.";

/// Configuration for the Gemini client
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: Url,
    pub model: String,
    pub request_timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self, VisionError> {
        let base_url = Url::parse(DEFAULT_BASE_URL)
            .map_err(|err| VisionError::Config(format!("base url parse failed: {err}")))?;
        Ok(Self {
            api_key: api_key.into(),
            base_url,
            model: DEFAULT_MODEL.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_base_url(mut self, base: impl AsRef<str>) -> Result<Self, VisionError> {
        self.base_url = Url::parse(base.as_ref())
            .map_err(|err| VisionError::Config(format!("base url parse failed: {err}")))?;
        if !self.base_url.path().ends_with('/') {
            self.base_url
                .set_path(&format!("{}/", self.base_url.path().trim_end_matches('/')));
        }
        Ok(self)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Gemini-backed [`ImageAnalyzer`]
pub struct GeminiVision {
    client: Client,
    config: GeminiConfig,
}

impl GeminiVision {
    pub fn new(config: GeminiConfig) -> Result<Self, VisionError> {
        if config.api_key.is_empty() {
            return Err(VisionError::Config("api key is empty".to_string()));
        }
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| VisionError::Config(format!("client build failed: {err}")))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> Result<Url, VisionError> {
        let joined = format!("v1beta/models/{}:generateContent", self.config.model);
        let mut url = self
            .config
            .base_url
            .join(&joined)
            .map_err(|err| VisionError::Config(format!("endpoint build failed: {err}")))?;
        url.query_pairs_mut().append_pair("key", &self.config.api_key);
        Ok(url)
    }
}

#[async_trait]
impl ImageAnalyzer for GeminiVision {
    async fn analyze(&self, image: &[u8], mime_type: &str) -> Result<AnalysisOutcome, VisionError> {
        let request = build_generate_request(image, mime_type);
        let endpoint = self.endpoint()?;

        let response = self
            .client
            .post(endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    VisionError::Upstream(format!("gemini request timed out: {err}"))
                } else {
                    VisionError::Upstream(format!("gemini request error: {err}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unavailable>".into());
            return Err(map_http_error(status, &body));
        }

        let payload = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|err| VisionError::Upstream(format!("gemini response decode: {err}")))?;

        let text = extract_text(payload)?;
        Ok(parse_model_output(&text))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: GenerateContent,
    contents: Vec<GenerateContent>,
    generation_config: serde_json::Value,
}

#[derive(Serialize)]
struct GenerateContent {
    role: String,
    parts: Vec<ContentPart>,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct ContentPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GenerateCandidate>,
}

#[derive(Deserialize)]
struct GenerateCandidate {
    content: Option<GenerateContentBlock>,
}

#[derive(Deserialize)]
struct GenerateContentBlock {
    #[serde(default)]
    parts: Vec<GeneratePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GeneratePart {
    text: Option<String>,
}

fn build_generate_request(image: &[u8], mime_type: &str) -> GenerateContentRequest {
    let encoded = base64::engine::general_purpose::STANDARD.encode(image);
    GenerateContentRequest {
        system_instruction: GenerateContent {
            role: "system".into(),
            parts: vec![ContentPart {
                text: Some(SYSTEM_PROMPT.to_string()),
                ..ContentPart::default()
            }],
        },
        contents: vec![GenerateContent {
            role: "user".into(),
            parts: vec![
                ContentPart {
                    text: Some("Analyze this image for civic issues.".to_string()),
                    ..ContentPart::default()
                },
                ContentPart {
                    inline_data: Some(InlineData {
                        mime_type: mime_type.to_string(),
                        data: encoded,
                    }),
                    ..ContentPart::default()
                },
            ],
        }],
        generation_config: json!({ "responseMimeType": "application/json" }),
    }
}

fn extract_text(payload: GenerateContentResponse) -> Result<String, VisionError> {
    let candidate = payload
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| VisionError::Upstream("gemini returned no candidates".to_string()))?;
    let content = candidate
        .content
        .ok_or_else(|| VisionError::Upstream("gemini candidate missing content".to_string()))?;

    let mut aggregated = String::new();
    for part in content.parts {
        if let Some(text) = part.text {
            aggregated.push_str(&text);
        }
    }
    Ok(aggregated)
}

fn map_http_error(status: StatusCode, body: &str) -> VisionError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            VisionError::Upstream(format!("gemini auth failed: {body}"))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            VisionError::Upstream(format!("gemini rate limited request: {body}"))
        }
        _ => VisionError::Upstream(format!("gemini returned {}: {}", status.as_u16(), body)),
    }
}
