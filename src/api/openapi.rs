//! OpenAPI specification definition.
//!
//! Aggregates all route handlers and schemas for OpenAPI documentation generation.

use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Diagrams
        crate::routes::diagrams::generate_diagram,
        crate::routes::diagrams::get_stats,
        crate::routes::diagrams::get_recent,
        // Health
        crate::routes::health::health_check,
        crate::routes::health::detailed_health_check,
        // OpenAPI
        crate::routes::openapi::serve_openapi_json,
    ),
    components(schemas(
        crate::models::DiagramType,
        crate::models::ProviderKind,
        crate::models::GenerateRequestBody,
        crate::models::GenerateResponse,
        crate::models::ValidationIssue,
        crate::models::DiagramStats,
        crate::models::TypeStats,
        crate::models::RecentDiagrams,
        crate::models::RecentDiagram,
    )),
    modifiers(&VersionAddon),
    tags(
        (name = "Diagrams", description = "Natural-language to Mermaid generation and reporting"),
        (name = "Health", description = "Liveness and dependency checks"),
        (name = "OpenAPI", description = "OpenAPI specification"),
    ),
    info(
        title = "SnapChart API",
        description = "Turns natural-language descriptions into Mermaid diagram source",
        version = "1.0.0",
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    )
)]
pub struct ApiDoc;

struct VersionAddon;

impl Modify for VersionAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        // Keep in step with Cargo.toml
        openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    }
}
