//! cyberguard-ai library interface
//!
//! Evidence aggregation and risk scoring for text, images and videos. The
//! binary in `main.rs` wires configuration, providers and the HTTP router;
//! everything else lives here so integration tests can drive it directly.

pub mod api;
pub mod config;
pub mod error;
pub mod extractors;
pub mod fanout;
pub mod history;
pub mod media;
pub mod normalizer;
pub mod pipeline;
pub mod providers;
pub mod scoring;
pub mod types;

pub use crate::error::{AnalysisError, ApiError, ApiResult};
pub use crate::pipeline::{Analyzer, AnalyzerSettings};

use axum::{extract::DefaultBodyLimit, Router};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last internal error for diagnostics
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(analyzer: Arc<Analyzer>) -> Self {
        Self {
            analyzer,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
///
/// `max_upload_bytes` bounds every request body.
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::status_routes())
        .merge(api::analyze_routes())
        .merge(api::history_routes())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
