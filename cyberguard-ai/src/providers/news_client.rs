//! News Client (news reliability)
//!
//! Looks the text up in NewsAPI's `everything` index. Coverage by reputable
//! outlets lowers risk; no coverage at all is itself a risk signal (scored
//! downstream).
//!
//! # API Reference
//! - Endpoint: https://newsapi.org/v2/everything
//! - 401 → invalid key, 429 → rate limited

use super::{
    build_http_client, json_or_text, leading_words, network_error, truncate_body, Provider,
    ProviderError, ProviderRequest,
};
use crate::types::{ContentKind, ProviderKind, RawPayload};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

pub const NEWSAPI_URL: &str = "https://newsapi.org/v2/everything";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const QUERY_WORDS: usize = 5;
const PAGE_SIZE: u32 = 5;

#[derive(Debug, Clone)]
pub struct NewsSettings {
    pub base_url: String,
    pub language: String,
    pub timeout: Duration,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            base_url: NEWSAPI_URL.to_string(),
            language: "en".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// News-index provider
pub struct NewsClient {
    http_client: Client,
    settings: NewsSettings,
    api_key: Option<String>,
}

impl NewsClient {
    pub fn new(api_key: Option<String>, settings: NewsSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: build_http_client(settings.timeout)?,
            settings,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }
}

#[async_trait]
impl Provider for NewsClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::News
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
            return Err(ProviderError::Unsupported("news search only accepts text".into()));
        };
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("NewsAPI key missing".into()))?;

        let query = leading_words(text, QUERY_WORDS);
        debug!(query = %query, "Searching news coverage");

        let page_size = PAGE_SIZE.to_string();
        let response = self
            .http_client
            .get(&self.settings.base_url)
            .query(&[
                ("q", query.as_str()),
                ("apiKey", key),
                ("language", self.settings.language.as_str()),
                ("sortBy", "relevancy"),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let body = response.text().await.map_err(network_error)?;
        match status {
            StatusCode::OK => Ok(json_or_text(body)),
            StatusCode::UNAUTHORIZED => Err(ProviderError::Http {
                status: 401,
                message: "API key invalid".into(),
            }),
            StatusCode::TOO_MANY_REQUESTS => {
                Err(ProviderError::Quota("NewsAPI rate limit exceeded".into()))
            }
            other => Err(ProviderError::Http {
                status: other.as_u16(),
                message: truncate_body(&body),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_is_text_only() {
        let client = NewsClient::new(Some("key".into()), NewsSettings::default()).unwrap();
        assert_eq!(client.kind(), ProviderKind::News);
        assert!(client.supports(ContentKind::Text));
        assert!(!client.supports(ContentKind::Video));
        assert_eq!(client.call_timeout(), Some(DEFAULT_TIMEOUT));
    }
}
