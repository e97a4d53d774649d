//! External analysis providers
//!
//! Every remote source implements [`Provider`]. Adapters only know how to
//! fetch a raw payload; deadline handling and failure-to-status mapping live
//! in the provided [`Provider::invoke`] so every provider behaves the same way
//! under the fan-out coordinator.
//!
//! # Adapters
//! - [`gemini_client`]: generative-AI verdict (text, image, video frames)
//! - [`factcheck_client`]: Google Fact Check Tools claim search (text only)
//! - [`news_client`]: NewsAPI article search (text only)

pub mod factcheck_client;
pub mod gemini_client;
pub mod news_client;

pub use factcheck_client::FactCheckClient;
pub use gemini_client::GeminiClient;
pub use news_client::NewsClient;

use crate::media::MediaFrame;
use crate::types::{ContentKind, ProviderKind, ProviderOutcome, RawPayload};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Maximum bytes of an error body kept in a message
const ERROR_BODY_CHARS: usize = 200;

/// Provider-local failure
///
/// Never escapes the fan-out: [`Provider::invoke`] turns it into an
/// `Error` outcome carrying the message.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Quota exceeded: {0}")]
    Quota(String),

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("Unsupported request: {0}")]
    Unsupported(String),
}

/// Request handed to every applicable provider
#[derive(Debug, Clone)]
pub enum ProviderRequest {
    Text(String),
    /// One image, or a batch of representative video frames
    Media {
        kind: ContentKind,
        frames: Vec<MediaFrame>,
    },
}

impl ProviderRequest {
    pub fn kind(&self) -> ContentKind {
        match self {
            ProviderRequest::Text(_) => ContentKind::Text,
            ProviderRequest::Media { kind, .. } => *kind,
        }
    }
}

/// Remote analysis source
#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// False when a credential is missing; the call is then never attempted
    fn is_configured(&self) -> bool {
        true
    }

    /// Whether this provider takes part in analysing `kind`
    fn supports(&self, kind: ContentKind) -> bool;

    /// Provider-specific per-call budget, if tighter than the coordinator's
    fn call_timeout(&self) -> Option<Duration> {
        None
    }

    /// Perform the remote call
    async fn fetch(&self, request: &ProviderRequest) -> Result<RawPayload, ProviderError>;

    /// Perform the call under `deadline` and resolve to an outcome
    ///
    /// Never fails: unconfigured → `Unavailable`, deadline exceeded →
    /// `Timeout` (the pending call is dropped), fetch error → `Error`.
    async fn invoke(&self, request: &ProviderRequest, deadline: Instant) -> ProviderOutcome {
        let kind = self.kind();
        if !self.is_configured() {
            debug!(provider = %kind, "Provider not configured, skipping");
            return ProviderOutcome::unavailable(kind);
        }

        let start = Instant::now();
        match tokio::time::timeout_at(deadline, self.fetch(request)).await {
            Ok(Ok(payload)) => {
                debug!(provider = %kind, elapsed_ms = start.elapsed().as_millis() as u64, "Provider call succeeded");
                ProviderOutcome::success(kind, payload, start.elapsed())
            }
            Ok(Err(e)) => {
                warn!(provider = %kind, error = %e, "Provider call failed");
                ProviderOutcome::error(kind, e.to_string(), start.elapsed())
            }
            Err(_) => {
                warn!(provider = %kind, elapsed_ms = start.elapsed().as_millis() as u64, "Provider call timed out");
                ProviderOutcome::timeout(kind, start.elapsed())
            }
        }
    }
}

/// Build the shared HTTP client for an adapter
pub(crate) fn build_http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("cyberguard-ai/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {}", e)))
}

/// First `n` whitespace-separated words of `text`
pub(crate) fn leading_words(text: &str, n: usize) -> String {
    text.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
}

/// Parse a 200 body as JSON; unparsable bodies are kept as text so the
/// normalizer can degrade them to an `UNKNOWN` verdict
pub(crate) fn json_or_text(body: String) -> RawPayload {
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => RawPayload::Json(value),
        Err(e) => {
            warn!(error = %e, "Provider returned a non-JSON body");
            RawPayload::Text(body)
        }
    }
}

/// Truncate an error body for inclusion in a message
pub(crate) fn truncate_body(body: &str) -> String {
    body.chars().take(ERROR_BODY_CHARS).collect()
}

/// Transport failure without the request URL, which carries the API key
pub(crate) fn network_error(e: reqwest::Error) -> ProviderError {
    let e = e.without_url();
    if e.is_timeout() {
        ProviderError::Network(format!("request timed out: {}", e))
    } else {
        ProviderError::Network(e.to_string())
    }
}
