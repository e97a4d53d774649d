//! Tracing initialisation shared by CyberGuard binaries

use crate::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber
///
/// `RUST_LOG` takes precedence; otherwise `default_directive` (e.g. `"info"`
/// or `"cyberguard_ai=debug,info"`) is used.
///
/// # Errors
/// Returns `Error::Internal` if a global subscriber is already installed or
/// the directive does not parse.
pub fn init_tracing(default_directive: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)
            .map_err(|e| Error::Config(format!("Invalid log filter '{}': {}", default_directive, e)))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| Error::Internal(format!("Tracing already initialised: {}", e)))
}
