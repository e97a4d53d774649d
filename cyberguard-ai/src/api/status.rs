//! Provider status endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::pipeline::ProviderAvailability;
use crate::AppState;

/// GET /api/status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub providers: Vec<ProviderAvailability>,
    /// True when at least one provider can be called
    pub any_configured: bool,
    pub max_video_frames: usize,
    pub ai_batch_frames: usize,
}

/// GET /api/status
///
/// Reports which providers were configured at startup. Unconfigured
/// providers are skipped during analysis and contribute nothing.
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let providers = state.analyzer.provider_status();
    let settings = state.analyzer.settings();

    Json(StatusResponse {
        any_configured: providers.iter().any(|p| p.configured),
        providers,
        max_video_frames: settings.max_video_frames,
        ai_batch_frames: settings.ai_batch_frames,
    })
}

pub fn status_routes() -> Router<AppState> {
    Router::new().route("/api/status", get(get_status))
}
