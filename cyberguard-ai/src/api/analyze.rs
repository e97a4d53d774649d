//! Analysis endpoints
//!
//! - `POST /api/analyze-text`: form field `text`
//! - `POST /api/analyze`: JSON `{"text": "..."}`
//! - `POST /api/analyze-image`: raw body, `Content-Type: image/*`
//! - `POST /api/analyze-video`: raw body, `Content-Type: video/*`
//!
//! Media routes accept an optional `?filename=` used for history previews.

use crate::error::AnalysisError;
use crate::types::{AnalysisInput, RiskAssessment};
use crate::{ApiError, ApiResult, AppState};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap},
    routing::post,
    Form, Json, Router,
};
use serde::Deserialize;
use tracing::{error, warn};

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

/// POST /api/analyze-text
pub async fn analyze_text_form(
    State(state): State<AppState>,
    Form(form): Form<TextRequest>,
) -> ApiResult<Json<RiskAssessment>> {
    run_analysis(&state, AnalysisInput::text(form.text)).await
}

/// POST /api/analyze
pub async fn analyze_text_json(
    State(state): State<AppState>,
    Json(request): Json<TextRequest>,
) -> ApiResult<Json<RiskAssessment>> {
    run_analysis(&state, AnalysisInput::text(request.text)).await
}

/// POST /api/analyze-image
pub async fn analyze_image(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<RiskAssessment>> {
    require_content_type(&headers, "image/")?;
    let input = with_name(AnalysisInput::image(body.to_vec()), query.filename);
    run_analysis(&state, input).await
}

/// POST /api/analyze-video
pub async fn analyze_video(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<RiskAssessment>> {
    require_content_type(&headers, "video/")?;
    let input = with_name(AnalysisInput::video(body.to_vec()), query.filename);
    run_analysis(&state, input).await
}

fn with_name(input: AnalysisInput, file_name: Option<String>) -> AnalysisInput {
    match file_name.filter(|n| !n.trim().is_empty()) {
        Some(name) => input.with_file_name(name),
        None => input,
    }
}

fn require_content_type(headers: &HeaderMap, prefix: &str) -> ApiResult<()> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if content_type.starts_with(prefix) {
        Ok(())
    } else {
        warn!(content_type = %content_type, expected = prefix, "Rejected upload");
        Err(ApiError::UnsupportedMedia(format!(
            "expected {}* content, got '{}'",
            prefix, content_type
        )))
    }
}

async fn run_analysis(state: &AppState, input: AnalysisInput) -> ApiResult<Json<RiskAssessment>> {
    match state.analyzer.analyze(input).await {
        Ok(assessment) => Ok(Json(assessment)),
        Err(err) => {
            if let AnalysisError::Internal(msg) = &err {
                error!(error = %msg, "Analysis failed");
                *state.last_error.write().await = Some(msg.clone());
            }
            Err(err.into())
        }
    }
}

pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/api/analyze-text", post(analyze_text_form))
        .route("/api/analyze", post(analyze_text_json))
        .route("/api/analyze-image", post(analyze_image))
        .route("/api/analyze-video", post(analyze_video))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[test]
    fn test_content_type_prefix() {
        assert!(require_content_type(&headers("image/png"), "image/").is_ok());
        assert!(require_content_type(&headers("Video/MP4"), "video/").is_ok());
        assert!(matches!(
            require_content_type(&headers("application/json"), "image/"),
            Err(ApiError::UnsupportedMedia(_))
        ));
        assert!(require_content_type(&HeaderMap::new(), "video/").is_err());
    }

    #[test]
    fn test_blank_file_name_ignored() {
        let input = with_name(AnalysisInput::image(vec![1, 2, 3]), Some("  ".into()));
        assert_eq!(input.preview(), "image file (3 bytes)");
    }
}
