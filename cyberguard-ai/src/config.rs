//! Configuration for cyberguard-ai
//!
//! Settings come from a TOML file (see [`cyberguard_common::config`] for file
//! discovery) with compiled defaults for every field. Credentials resolve
//! ENV → TOML; blank values are ignored.

use crate::fanout::FanOutPolicy;
use crate::providers::factcheck_client::{self, FactCheckSettings};
use crate::providers::gemini_client::{self, GeminiSettings};
use crate::providers::news_client::{self, NewsSettings};
use crate::scoring::WeightTable;
use cyberguard_common::config::{
    env_value, is_valid_key, load_toml_config, resolve_config_path, LoggingConfig,
};
use cyberguard_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CYBERGUARD_CONFIG";
/// Config file name looked up in the platform config directory
pub const CONFIG_FILE_NAME: &str = "cyberguard-ai.toml";

pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";
pub const GEMINI_BACKUP_KEY_ENV: &str = "GEMINI_API_KEY_BACKUP";
pub const FACTCHECK_KEY_ENV: &str = "FACTCHECK_API_KEY";
pub const NEWSAPI_KEY_ENV: &str = "NEWSAPI_KEY";

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub providers: ProvidersConfig,
    pub fanout: FanOutConfig,
    pub scoring: WeightTable,
    pub video: VideoConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5730".to_string(),
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub gemini: GeminiConfig,
    pub factcheck: FactCheckConfig,
    pub news: NewsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Candidate keys tried after the environment ones, in order
    pub api_keys: Vec<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            model: gemini_client::DEFAULT_MODEL.to_string(),
            base_url: gemini_client::GEMINI_API_BASE.to_string(),
            timeout_secs: gemini_client::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FactCheckConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub language_code: String,
    pub timeout_secs: u64,
}

impl Default for FactCheckConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: factcheck_client::FACTCHECK_API_URL.to_string(),
            language_code: "en".to_string(),
            timeout_secs: factcheck_client::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: news_client::NEWSAPI_URL.to_string(),
            language: "en".to_string(),
            timeout_secs: news_client::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FanOutConfig {
    pub per_call_timeout_secs: u64,
    pub aggregate_timeout_secs: u64,
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            per_call_timeout_secs: 60,
            aggregate_timeout_secs: 90,
        }
    }
}

impl FanOutConfig {
    pub fn policy(&self) -> FanOutPolicy {
        FanOutPolicy {
            per_call: Duration::from_secs(self.per_call_timeout_secs),
            aggregate: Duration::from_secs(self.aggregate_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Ceiling on sampled frames (never above 6)
    pub max_frames: usize,
    /// Representative frames sent in the single AI call
    pub ai_batch_frames: usize,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            max_frames: 6,
            ai_batch_frames: 3,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: crate::history::DEFAULT_CAPACITY,
        }
    }
}

impl AnalyzerConfig {
    /// Resolve, load and validate the configuration
    ///
    /// **Priority:** `cli_path` → `CYBERGUARD_CONFIG` → platform config dir → defaults
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let path = resolve_config_path(cli_path, CONFIG_ENV_VAR, CONFIG_FILE_NAME);
        let config: AnalyzerConfig = load_toml_config(path.as_deref())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnalyzerConfig =
            toml::from_str(content).map_err(|e| Error::Config(format!("Parse failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.scoring.validate().map_err(Error::Config)?;

        if self.fanout.per_call_timeout_secs == 0 || self.fanout.aggregate_timeout_secs == 0 {
            return Err(Error::Config("fan-out timeouts must be positive".into()));
        }
        let provider_timeouts = [
            ("gemini", self.providers.gemini.timeout_secs),
            ("factcheck", self.providers.factcheck.timeout_secs),
            ("news", self.providers.news.timeout_secs),
        ];
        for (name, secs) in provider_timeouts {
            if secs == 0 {
                return Err(Error::Config(format!("{} timeout must be positive", name)));
            }
        }
        if self.video.max_frames == 0 || self.video.ai_batch_frames == 0 {
            return Err(Error::Config(
                "video max_frames and ai_batch_frames must be at least 1".into(),
            ));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(Error::Config("max_upload_bytes must be positive".into()));
        }
        Ok(())
    }

    /// Ordered Gemini key candidates: ENV primary, ENV backup, then TOML
    pub fn gemini_key_candidates(&self) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::new();
        let env_keys = [env_value(GEMINI_KEY_ENV), env_value(GEMINI_BACKUP_KEY_ENV)];
        let toml_keys = self
            .providers
            .gemini
            .api_keys
            .iter()
            .filter(|k| is_valid_key(k))
            .map(|k| Some(k.trim().to_string()));

        for key in env_keys.into_iter().chain(toml_keys).flatten() {
            if !candidates.contains(&key) {
                candidates.push(key);
            }
        }
        info!(candidates = candidates.len(), "Gemini API key candidates resolved");
        candidates
    }

    /// Fact Check Tools key (ENV → TOML)
    pub fn factcheck_api_key(&self) -> Option<String> {
        resolve_key(
            "Fact Check",
            FACTCHECK_KEY_ENV,
            self.providers.factcheck.api_key.as_deref(),
        )
    }

    /// NewsAPI key (ENV → TOML)
    pub fn news_api_key(&self) -> Option<String> {
        resolve_key("NewsAPI", NEWSAPI_KEY_ENV, self.providers.news.api_key.as_deref())
    }

    pub fn gemini_settings(&self) -> GeminiSettings {
        let gemini = &self.providers.gemini;
        GeminiSettings {
            base_url: gemini.base_url.trim_end_matches('/').to_string(),
            model: gemini.model.clone(),
            timeout: Duration::from_secs(gemini.timeout_secs),
        }
    }

    pub fn factcheck_settings(&self) -> FactCheckSettings {
        let factcheck = &self.providers.factcheck;
        FactCheckSettings {
            base_url: factcheck.base_url.clone(),
            language_code: factcheck.language_code.clone(),
            timeout: Duration::from_secs(factcheck.timeout_secs),
        }
    }

    pub fn news_settings(&self) -> NewsSettings {
        let news = &self.providers.news;
        NewsSettings {
            base_url: news.base_url.clone(),
            language: news.language.clone(),
            timeout: Duration::from_secs(news.timeout_secs),
        }
    }
}

/// Resolve a single credential
///
/// **Priority:** ENV → TOML
fn resolve_key(name: &str, env_var: &str, toml_key: Option<&str>) -> Option<String> {
    let env_key = env_value(env_var);
    let toml_key = toml_key.filter(|k| is_valid_key(k)).map(|k| k.trim().to_string());

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "{} API key found in environment and TOML. Using environment (highest priority).",
            name
        );
    }

    match (env_key, toml_key) {
        (Some(key), _) => {
            info!("{} API key loaded from environment variable {}", name, env_var);
            Some(key)
        }
        (None, Some(key)) => {
            info!("{} API key loaded from TOML config", name);
            Some(key)
        }
        (None, None) => {
            warn!("{} API key not configured; provider unavailable", name);
            None
        }
    }
}
