use super::diagram::GenerateResponse;
use super::enums::{DiagramType, ProviderKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Row appended to the durable diagram log. Never updated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramRecord {
    pub id: String,
    pub diagram_type: DiagramType,
    pub prompt: String,
    pub code: String,
    pub provider: ProviderKind,
    pub attempts: u32,
    pub duration: u64,
    pub cached: bool,
    pub created_at: DateTime<Utc>,
}

impl DiagramRecord {
    pub fn from_response(response: &GenerateResponse, prompt: &str) -> Self {
        Self {
            id: response.id.clone(),
            diagram_type: response.diagram_type,
            prompt: prompt.to_string(),
            code: response.code.clone(),
            provider: response.provider,
            attempts: response.attempts,
            duration: response.duration,
            cached: response.cached,
            created_at: response.timestamp,
        }
    }
}

/// Per-type aggregate over the stats window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TypeStats {
    #[serde(rename = "type")]
    pub diagram_type: String,
    pub count: u64,
    pub avg_duration: f64,
    pub min_duration: u64,
    pub max_duration: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagramStats {
    pub period: String,
    pub total: u64,
    pub by_type: Vec<TypeStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecentDiagram {
    pub id: String,
    #[serde(rename = "type")]
    pub diagram_type: String,
    pub duration: u64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecentDiagrams {
    pub diagrams: Vec<RecentDiagram>,
}
