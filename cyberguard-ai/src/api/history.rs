//! Assessment history endpoints

use crate::types::RiskAssessment;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub assessments: Vec<RiskAssessment>,
}

/// GET /api/history?limit=N
///
/// Newest first; `limit` defaults to 20 and is capped at 200.
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let assessments = state.analyzer.history().recent(limit).await;

    Json(HistoryResponse {
        count: assessments.len(),
        assessments,
    })
}

/// GET /api/history/:fingerprint
pub async fn get_assessment(
    State(state): State<AppState>,
    Path(fingerprint): Path<String>,
) -> ApiResult<Json<RiskAssessment>> {
    state
        .analyzer
        .history()
        .get(&fingerprint)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No assessment for fingerprint {}", fingerprint)))
}

pub fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/api/history", get(list_history))
        .route("/api/history/:fingerprint", get(get_assessment))
}
