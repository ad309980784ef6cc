//! HTTP API surface for the analysis pipeline.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::export;
use crate::pipeline::{AnalysisError, AnalyzeOptions, Analyzer, ResultSet};
use crate::youtube::YouTubeClient;

/// Shared, immutable per-process state. Each request runs its own pipeline
/// invocation against it; no mutable state crosses runs.
pub struct AppState {
    pub analyzer: Analyzer,
    pub youtube: YouTubeClient,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Video URL (watch or youtu.be form) or bare 11-character id.
    pub video_url: String,
    /// Upper bound on fetched comments. Defaults to 100.
    pub max_comments: Option<usize>,
    /// Exclude stopwords from the keyword table. Defaults to true.
    pub filter_stopwords: Option<bool>,
}

impl AnalyzeRequest {
    fn options(&self) -> AnalyzeOptions {
        let defaults = AnalyzeOptions::default();
        AnalyzeOptions {
            max_comments: self.max_comments.unwrap_or(defaults.max_comments),
            filter_stopwords: self.filter_stopwords.unwrap_or(defaults.filter_stopwords),
            keyword_limit: defaults.keyword_limit,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_owned(),
            message: message.into(),
        }),
    )
}

async fn run_analysis(state: &AppState, request: &AnalyzeRequest) -> Result<ResultSet, ApiError> {
    let options = request.options();
    if options.max_comments == 0 {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "invalid_cap",
            "max_comments must be greater than zero",
        ));
    }

    state
        .analyzer
        .analyze(&state.youtube, &request.video_url, &options)
        .await
        .map_err(|e| match &e {
            AnalysisError::InvalidReference => {
                error_response(StatusCode::BAD_REQUEST, "invalid_reference", e.to_string())
            }
            AnalysisError::NoComments => {
                error_response(StatusCode::NOT_FOUND, "no_comments", e.to_string())
            }
            AnalysisError::SourceUnavailable(detail) => {
                // Clients get a generic retry-later message; the detail is log-only.
                eprintln!("❌ Comment source unavailable: {}", detail);
                error_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "source_unavailable",
                    "The comment source is unavailable right now, please try again later",
                )
            }
        })
}

/// Analyze the comments of a video.
#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Classified comments with aggregates", body = ResultSet),
        (status = 400, description = "Unresolvable reference or invalid cap", body = ErrorResponse),
        (status = 404, description = "No comments available", body = ErrorResponse),
        (status = 503, description = "Comment source unavailable", body = ErrorResponse)
    ),
    tag = "analysis"
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ResultSet>, ApiError> {
    run_analysis(&state, &request).await.map(Json)
}

/// Analyze and download the results as CSV.
#[utoipa::path(
    post,
    path = "/analyze/export",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "CSV with Comment,Sentiment columns", body = String, content_type = "text/csv"),
        (status = 400, description = "Unresolvable reference or invalid cap", body = ErrorResponse),
        (status = 404, description = "No comments available", body = ErrorResponse),
        (status = 503, description = "Comment source unavailable", body = ErrorResponse)
    ),
    tag = "analysis"
)]
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let results = run_analysis(&state, &request).await?;
    let csv = export::to_csv(&results);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"youtube_sentiment_results.csv\"",
            ),
        ],
        csv,
    ))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "analysis"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
    })
}
