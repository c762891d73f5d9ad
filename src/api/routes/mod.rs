//! API routes module - organizes all route handlers.
//!
//! Diagram endpoints live under /api/diagrams, health checks under /health.

pub mod app_state;
pub mod diagrams;
pub mod error;
pub mod health;
pub mod openapi;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

pub use app_state::AppState;
pub use error::ApiError;

use crate::middleware::create_cors_layer;

/// Create the /api router. Unknown API paths always answer with JSON 404.
pub fn create_api_router(app_state: &AppState) -> Router<AppState> {
    Router::new()
        .nest(
            "/diagrams",
            diagrams::diagrams_router(app_state.rate_limiter.clone()),
        )
        .merge(openapi::openapi_router())
        .fallback(not_found)
}

/// Build the complete application: routes, fallback, tracing and CORS.
pub fn create_app(app_state: AppState) -> Router {
    let mut app = Router::new()
        .nest("/health", health::health_router())
        .nest("/api", create_api_router(&app_state));

    app = match &app_state.config.frontend_dir {
        Some(frontend_dir) => {
            info!("Serving frontend from: {:?}", frontend_dir);
            app.fallback_service(ServeDir::new(frontend_dir).append_index_html_on_directories(true))
        }
        None => app.fallback(not_found),
    };

    let cors = create_cors_layer(&app_state.config.cors_origin);

    // Apply with_state first so middleware sees a Router<()>
    app.with_state(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}
