//! # CyberGuard Common Library
//!
//! Shared code for the CyberGuard services including:
//! - Error and result types
//! - Configuration file discovery and loading
//! - Content fingerprinting
//! - Tracing initialisation

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod logging;

pub use error::{Error, Result};
pub use fingerprint::content_fingerprint;
