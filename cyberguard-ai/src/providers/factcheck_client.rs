//! Fact Check Client (claims database)
//!
//! Searches Google Fact Check Tools for published reviews of claims similar
//! to the submitted text. Only text requests are supported.
//!
//! # Status mapping
//! - 200 → Success (JSON body)
//! - 400 → Error "Invalid request parameters"
//! - 403 → Error "API key invalid or quota exceeded"
//! - other → Error with the status and a truncated body
//!
//! # API Reference
//! - Endpoint: https://factchecktools.googleapis.com/v1alpha1/claims:search

use super::{
    build_http_client, json_or_text, leading_words, network_error, truncate_body, Provider,
    ProviderError, ProviderRequest,
};
use crate::types::{ContentKind, ProviderKind, RawPayload};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Fact Check Tools claim search endpoint
pub const FACTCHECK_API_URL: &str = "https://factchecktools.googleapis.com/v1alpha1/claims:search";

/// Default timeout for claim searches
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Words of the text used as the search query
const QUERY_WORDS: usize = 10;

/// Claims requested per search
const PAGE_SIZE: u32 = 5;

#[derive(Debug, Clone)]
pub struct FactCheckSettings {
    pub base_url: String,
    pub language_code: String,
    pub timeout: Duration,
}

impl Default for FactCheckSettings {
    fn default() -> Self {
        Self {
            base_url: FACTCHECK_API_URL.to_string(),
            language_code: "en".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Claims-database provider
pub struct FactCheckClient {
    http_client: Client,
    settings: FactCheckSettings,
    api_key: Option<String>,
}

impl FactCheckClient {
    pub fn new(api_key: Option<String>, settings: FactCheckSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: build_http_client(settings.timeout)?,
            settings,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }
}

#[async_trait]
impl Provider for FactCheckClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Claims
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn supports(&self, kind: ContentKind) -> bool {
        kind == ContentKind::Text
    }

    fn call_timeout(&self) -> Option<Duration> {
        Some(self.settings.timeout)
    }

    async fn fetch(&self, request: &ProviderRequest) -> Result<RawPayload, ProviderError> {
        let ProviderRequest::Text(text) = request else {
            return Err(ProviderError::Unsupported(
                "claim search only accepts text".into(),
            ));
        };
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("Fact Check API key missing".into()))?;

        let query = leading_words(text, QUERY_WORDS);
        debug!(query = %query, "Searching fact-check claims");

        let page_size = PAGE_SIZE.to_string();
        let response = self
            .http_client
            .get(&self.settings.base_url)
            .query(&[
                ("key", key),
                ("query", query.as_str()),
                ("languageCode", self.settings.language_code.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let body = response.text().await.map_err(network_error)?;
        match status {
            StatusCode::OK => Ok(json_or_text(body)),
            StatusCode::BAD_REQUEST => Err(ProviderError::Http {
                status: 400,
                message: "Invalid request parameters".into(),
            }),
            StatusCode::FORBIDDEN => Err(ProviderError::Http {
                status: 403,
                message: "API key invalid or quota exceeded".into(),
            }),
            other => Err(ProviderError::Http {
                status: other.as_u16(),
                message: truncate_body(&body),
            }),
        }
    }
}
