//! CORS middleware configuration.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tracing::warn;

/// Create a CORS layer for the configured browser origin.
///
/// Credentials are allowed, so the origin must be exact. An origin that is
/// not a valid header value yields a layer that allows no cross-origin
/// requests.
pub fn create_cors_layer(origin: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(origin) {
        Ok(origin) => base.allow_origin(origin),
        Err(e) => {
            warn!("Invalid CORS origin {:?}: {}. Cross-origin requests disabled.", origin, e);
            base
        }
    }
}
