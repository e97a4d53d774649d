//! Gemini Client (AI verdict)
//!
//! Asks a Gemini model for a verdict on text, a single image or a batch of
//! video frames. The response is free text; the normalizer extracts the
//! `VERDICT:` / `CONFIDENCE:` / `ANALYSIS:` markers.
//!
//! # Credentials
//! Built from an ordered list of candidate API keys (primary first, then
//! backups). [`GeminiClient::connect`] validates each candidate with a cheap
//! model-listing request and keeps the first one accepted. When no candidate
//! is accepted the client is unconfigured and resolves to `Unavailable`.
//!
//! # API Reference
//! - Endpoint: `POST {base}/models/{model}:generateContent`
//! - Documentation: https://ai.google.dev/api/generate-content

use super::{
    build_http_client, network_error, truncate_body, Provider, ProviderError, ProviderRequest,
};
use crate::types::{ContentKind, ProviderKind, RawPayload};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Gemini REST API base
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default timeout for generation requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for key validation requests
const VALIDATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Gemini connection settings
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: GEMINI_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Gemini AI-verdict provider
pub struct GeminiClient {
    http_client: Client,
    settings: GeminiSettings,
    /// Accepted API key; `None` when unconfigured
    api_key: Option<String>,
}

impl GeminiClient {
    /// Create a client with a known key (no validation)
    pub fn new(api_key: Option<String>, settings: GeminiSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: build_http_client(settings.timeout)?,
            settings,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Create a client from ordered candidate keys, keeping the first one the
    /// API accepts
    pub async fn connect(
        candidates: &[String],
        settings: GeminiSettings,
    ) -> Result<Self, ProviderError> {
        let mut client = Self::new(None, settings)?;

        for (index, key) in candidates.iter().enumerate() {
            if key.trim().is_empty() {
                continue;
            }
            match client.validate_api_key(key).await {
                Ok(()) => {
                    info!(candidate = index, model = %client.settings.model, "Gemini API key accepted");
                    client.api_key = Some(key.clone());
                    return Ok(client);
                }
                Err(e) => {
                    warn!(candidate = index, error = %e, "Gemini API key rejected, trying next candidate");
                }
            }
        }

        warn!(
            candidates = candidates.len(),
            "No usable Gemini API key; AI verdicts unavailable"
        );
        Ok(client)
    }

    /// Validate a key with a one-item model listing
    pub async fn validate_api_key(&self, key: &str) -> Result<(), ProviderError> {
        debug!("Validating Gemini API key");

        let url = format!("{}/models", self.settings.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("key", key), ("pageSize", "1")])
            .timeout(VALIDATION_TIMEOUT)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status, &body))
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn request_body(&self, request: &ProviderRequest) -> Value {
        let mut parts = vec![json!({ "text": build_prompt(request) })];
        if let ProviderRequest::Media { frames, .. } = request {
            for frame in frames {
                parts.push(json!({
                    "inlineData": {
                        "mimeType": frame.mime_type,
                        "data": BASE64.encode(&frame.data),
                    }
                }));
            }
        }
        json!({ "contents": [{ "parts": parts }] })
    }
}

#[async_trait]
impl Provider for GeminiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::AiVerdict
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn supports(&self, _kind: ContentKind) -> bool {
        true
    }

    fn call_timeout(&self) -> Option<Duration> {
        Some(self.settings.timeout)
    }

    async fn fetch(&self, request: &ProviderRequest) -> Result<RawPayload, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("Gemini API key missing".into()))?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.base_url, self.settings.model
        );
        debug!(model = %self.settings.model, kind = %request.kind(), "Requesting Gemini verdict");

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", key)])
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let body = response.text().await.map_err(network_error)?;
        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        let parsed: GenerateContentResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Gemini response was not valid JSON");
                return Ok(RawPayload::Text(body));
            }
        };

        let text = parsed.text();
        if text.is_empty() {
            let block_reason = parsed
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "none".to_string());
            warn!(block_reason = %block_reason, "Gemini returned no text");
        }
        Ok(RawPayload::Text(text))
    }
}

/// Map a non-success status to a provider error
fn classify_status(status: StatusCode, body: &str) -> ProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            ProviderError::Quota(format!("Gemini quota exceeded: {}", truncate_body(body)))
        }
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::Http {
                status: status.as_u16(),
                message: format!("Gemini rejected the request or key: {}", truncate_body(body)),
            }
        }
        _ => ProviderError::Http {
            status: status.as_u16(),
            message: truncate_body(body),
        },
    }
}

/// Prompt for the request kind
pub fn build_prompt(request: &ProviderRequest) -> String {
    match request {
        ProviderRequest::Text(text) => format!(
            "Analyze the following text for misinformation, fake news and manipulation.\n\n\
             TEXT:\n\"{}\"\n\n\
             Respond using exactly these lines:\n\
             VERDICT: one of FAKE NEWS, MODERATELY FAKE, LEGITIMATE\n\
             CONFIDENCE: a percentage from 0 to 100\n\
             ANALYSIS: a short explanation\n\
             Then list the key evidence as bullet points starting with \"- \".\n\
             Consider factual accuracy, emotional manipulation, source credibility, \
             logical consistency and signs of bias.",
            text
        ),
        ProviderRequest::Media {
            kind: ContentKind::Video,
            frames,
        } => format!(
            "These {} frames were sampled from the beginning, middle and end of one video. \
             Judge whether the video is a deepfake or has been manipulated.\n\n\
             Respond using exactly these lines:\n\
             VERDICT: one of AUTHENTIC, SUSPICIOUS, LIKELY FAKE, MANIPULATED\n\
             CONFIDENCE: a percentage from 0 to 100\n\
             ANALYSIS: a short explanation\n\
             Then list the key evidence as bullet points starting with \"- \".\n\
             Look for facial inconsistencies, lighting and shadow mismatches, \
             blending artifacts and temporal inconsistencies between frames.",
            frames.len()
        ),
        ProviderRequest::Media { .. } => "Judge whether this image is authentic or has been \
             manipulated (deepfake, splicing, AI generation).\n\n\
             Respond using exactly these lines:\n\
             VERDICT: one of AUTHENTIC, SUSPICIOUS, LIKELY FAKE, MANIPULATED\n\
             CONFIDENCE: a percentage from 0 to 100\n\
             ANALYSIS: a short explanation\n\
             Then list the key evidence as bullet points starting with \"- \".\n\
             Look for facial irregularities, lighting inconsistencies, compression \
             artifacts and unnatural edges."
            .to_string(),
    }
}

// ============================================================================
// Gemini API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts joined
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
