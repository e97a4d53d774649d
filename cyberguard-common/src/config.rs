//! Configuration file discovery and loading
//!
//! Config file resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform configuration directory (`<config dir>/cyberguard/<file name>`)
//! 4. No file: callers fall back to compiled defaults
//!
//! A missing config file is never fatal. A file that exists but does not parse is.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory name used under the platform configuration directory
pub const CONFIG_DIR_NAME: &str = "cyberguard";

/// Logging section shared by every service config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive (overridden by `RUST_LOG`)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Resolve the configuration file path
///
/// # Arguments
/// * `cli_arg` - Path given on the command line, if any
/// * `env_var_name` - Environment variable holding an explicit path
/// * `file_name` - File name looked up in the platform config directory
///
/// # Returns
/// The first candidate found, or `None` when no config file is available
pub fn resolve_config_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    file_name: &str,
) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    let candidate = default_config_dir()?.join(file_name);
    candidate.exists().then_some(candidate)
}

/// Platform configuration directory for CyberGuard
///
/// `~/.config/cyberguard` on Linux, `~/Library/Application Support/cyberguard`
/// on macOS, `%APPDATA%\cyberguard` on Windows.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME))
}

/// Load a TOML config file, falling back to defaults when it is absent
///
/// # Errors
/// Returns `Error::Config` if the file exists but cannot be read or parsed.
pub fn load_toml_config<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        info!("No config file found, using compiled defaults");
        return Ok(T::default());
    };

    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using compiled defaults");
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Validate a credential value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Read an environment variable, ignoring blank values
pub fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|v| is_valid_key(v))
        .map(|v| v.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Sample {
        name: String,
        logging: LoggingConfig,
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   \t"));
    }

    #[test]
    fn test_cli_arg_wins() {
        let path = resolve_config_path(
            Some(Path::new("/tmp/explicit.toml")),
            "CYBERGUARD_TEST_UNSET_VAR",
            "whatever.toml",
        );
        assert_eq!(path, Some(PathBuf::from("/tmp/explicit.toml")));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let sample: Sample =
            load_toml_config(Some(Path::new("/definitely/not/here.toml"))).unwrap();
        assert_eq!(sample.name, "");
        assert_eq!(sample.logging.level, "info");
    }

    #[test]
    fn test_no_path_gives_defaults() {
        let sample: Sample = load_toml_config(None).unwrap();
        assert_eq!(sample.logging.level, "info");
    }
}
