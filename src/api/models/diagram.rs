use super::enums::{DiagramType, ProviderKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Upper bound on prompt length, counted in characters after trimming.
pub const MAX_PROMPT_CHARS: usize = 2000;

/// A single field-level problem with an inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Body of `POST /api/diagrams/generate`, as documented for clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateRequestBody {
    #[serde(rename = "type")]
    pub diagram_type: DiagramType,
    /// 1 to 2000 characters after trimming
    pub prompt: String,
}

/// A validated generation request. `prompt` is already trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramRequest {
    pub diagram_type: DiagramType,
    pub prompt: String,
}

impl DiagramRequest {
    /// Validate a decoded JSON body, collecting every field issue.
    pub fn from_json(body: &Value) -> Result<Self, Vec<ValidationIssue>> {
        let mut issues = Vec::new();

        let diagram_type = match body.get("type") {
            None | Some(Value::Null) => {
                issues.push(ValidationIssue::new("type", "Diagram type is required"));
                None
            }
            Some(Value::String(tag)) => match tag.parse::<DiagramType>() {
                Ok(t) => Some(t),
                Err(e) => {
                    issues.push(ValidationIssue::new("type", e.to_string()));
                    None
                }
            },
            Some(other) => {
                issues.push(ValidationIssue::new(
                    "type",
                    format!("Invalid diagram type '{other}'"),
                ));
                None
            }
        };

        let prompt = match body.get("prompt") {
            Some(Value::String(raw)) => match validate_prompt(raw) {
                Ok(p) => Some(p),
                Err(message) => {
                    issues.push(ValidationIssue::new("prompt", message));
                    None
                }
            },
            _ => {
                issues.push(ValidationIssue::new(
                    "prompt",
                    "Prompt must be a non-empty string",
                ));
                None
            }
        };

        match (diagram_type, prompt) {
            (Some(diagram_type), Some(prompt)) if issues.is_empty() => Ok(Self {
                diagram_type,
                prompt,
            }),
            _ => Err(issues),
        }
    }
}

/// Trim a prompt and check its length bound. Returns the trimmed prompt.
pub fn validate_prompt(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let chars = trimmed.chars().count();

    if chars == 0 {
        return Err("Prompt cannot be empty".to_string());
    }
    if chars > MAX_PROMPT_CHARS {
        return Err(format!("Prompt cannot exceed {MAX_PROMPT_CHARS} characters"));
    }
    Ok(trimmed.to_string())
}

/// Result of a generation or a cache hit, as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub diagram_type: DiagramType,
    /// Mermaid markup
    pub code: String,
    /// Wall-clock generation time in milliseconds
    pub duration: u64,
    pub provider: ProviderKind,
    pub attempts: u32,
    pub cached: bool,
    pub timestamp: DateTime<Utc>,
}
