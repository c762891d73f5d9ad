//! Liveness and dependency health checks.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};

use super::app_state::AppState;

pub fn health_router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/detailed", get(detailed_health_check))
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// GET /health - Process liveness
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = Object)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": now_iso(),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
    }))
}

/// GET /health/detailed - Database and cache status
#[utoipa::path(
    get,
    path = "/health/detailed",
    tag = "Health",
    responses(
        (status = 200, description = "All dependencies healthy", body = Object),
        (status = 500, description = "A dependency check failed", body = Object)
    )
)]
pub async fn detailed_health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if let Err(e) = state.diagram_log.ping().await {
        tracing::error!("Database health check failed: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "error",
                "message": e.to_string(),
            })),
        );
    }

    let cache_stats = state.cache.stats().await;

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "timestamp": now_iso(),
            "checks": {
                "database": "ok",
                "cache": {
                    "status": "ok",
                    "size": cache_stats.size,
                }
            }
        })),
    )
}
