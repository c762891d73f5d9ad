//! Diagram generation and reporting routes.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    middleware::from_fn_with_state,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, warn};
use utoipa::IntoParams;

use super::app_state::AppState;
use super::error::ApiError;
use crate::middleware::{RateLimiterState, rate_limit_middleware};
use crate::models::{
    DiagramRequest, DiagramStats, GenerateRequestBody, GenerateResponse, RecentDiagrams,
    ValidationIssue,
};

/// Trailing window for `/stats`.
pub const STATS_WINDOW_DAYS: u32 = 7;
pub const DEFAULT_RECENT_LIMIT: u32 = 10;
pub const MAX_RECENT_LIMIT: u32 = 100;

/// Create the diagrams router. Only generation is rate limited.
pub fn diagrams_router(rate_limiter: RateLimiterState) -> Router<AppState> {
    Router::new()
        .route(
            "/generate",
            post(generate_diagram).layer(from_fn_with_state(rate_limiter, rate_limit_middleware)),
        )
        .route("/stats", get(get_stats))
        .route("/recent", get(get_recent))
}

/// POST /api/diagrams/generate - Generate Mermaid code from a prompt
#[utoipa::path(
    post,
    path = "/api/diagrams/generate",
    tag = "Diagrams",
    request_body = GenerateRequestBody,
    responses(
        (status = 200, description = "Diagram generated or served from cache", body = GenerateResponse),
        (status = 400, description = "Validation failed"),
        (status = 429, description = "Too many generation requests"),
        (status = 500, description = "Generation or configuration failure")
    )
)]
pub async fn generate_diagram(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        ApiError::validation(vec![ValidationIssue {
            field: "body".to_string(),
            message: rejection.body_text(),
        }])
    })?;

    let request = DiagramRequest::from_json(&body).map_err(ApiError::validation)?;

    match state.diagrams.generate(&request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Generate error: {}", e);
            Err(e.into())
        }
    }
}

/// GET /api/diagrams/stats - Per-type counts and durations over the last 7 days
#[utoipa::path(
    get,
    path = "/api/diagrams/stats",
    tag = "Diagrams",
    responses(
        (status = 200, description = "Aggregate statistics", body = DiagramStats),
        (status = 500, description = "Failed to fetch stats")
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<DiagramStats>, ApiError> {
    state
        .diagram_log
        .stats(STATS_WINDOW_DAYS)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Stats error: {}", e);
            ApiError::internal("Failed to fetch stats", e.to_string())
        })
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentQuery {
    /// Number of records to return (1-100, default 10)
    pub limit: Option<String>,
}

/// Parse `limit`, falling back to the default when absent or not a number.
pub fn resolve_recent_limit(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return DEFAULT_RECENT_LIMIT;
    };

    match raw.trim().parse::<i64>() {
        Ok(n) => n.clamp(1, MAX_RECENT_LIMIT as i64) as u32,
        Err(_) => {
            warn!("Ignoring unparsable limit '{}'", raw);
            DEFAULT_RECENT_LIMIT
        }
    }
}

/// GET /api/diagrams/recent - Most recently generated diagrams
#[utoipa::path(
    get,
    path = "/api/diagrams/recent",
    tag = "Diagrams",
    params(RecentQuery),
    responses(
        (status = 200, description = "Newest diagrams first", body = RecentDiagrams),
        (status = 500, description = "Failed to fetch recent diagrams")
    )
)]
pub async fn get_recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<RecentDiagrams>, ApiError> {
    let limit = resolve_recent_limit(query.limit.as_deref());

    match state.diagram_log.recent(limit).await {
        Ok(diagrams) => Ok(Json(RecentDiagrams { diagrams })),
        Err(e) => {
            error!("Recent error: {}", e);
            Err(ApiError::internal(
                "Failed to fetch recent diagrams",
                e.to_string(),
            ))
        }
    }
}
