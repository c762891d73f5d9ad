use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// Diagram families the generator knows how to prompt for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiagramType {
    Flowchart,
    Sequence,
    Pie,
    Gantt,
    #[serde(rename = "er")]
    EntityRelationship,
    State,
    Journey,
    Graph,
}

impl DiagramType {
    pub const ALL: [DiagramType; 8] = [
        DiagramType::Flowchart,
        DiagramType::Sequence,
        DiagramType::Pie,
        DiagramType::Gantt,
        DiagramType::EntityRelationship,
        DiagramType::State,
        DiagramType::Journey,
        DiagramType::Graph,
    ];

    /// Wire tag, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramType::Flowchart => "flowchart",
            DiagramType::Sequence => "sequence",
            DiagramType::Pie => "pie",
            DiagramType::Gantt => "gantt",
            DiagramType::EntityRelationship => "er",
            DiagramType::State => "state",
            DiagramType::Journey => "journey",
            DiagramType::Graph => "graph",
        }
    }
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid diagram type '{0}'")]
pub struct ParseDiagramTypeError(pub String);

impl FromStr for DiagramType {
    type Err = ParseDiagramTypeError;

    /// Case-sensitive: `FLOWCHART` is not a diagram type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiagramType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseDiagramTypeError(s.to_string()))
    }
}

/// Text-generation vendors.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Claude,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Claude => "claude",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Gemini",
            ProviderKind::Claude => "Claude",
        }
    }

    /// The vendor used when this one is the primary and fails.
    pub fn other(&self) -> ProviderKind {
        match self {
            ProviderKind::Gemini => ProviderKind::Claude,
            ProviderKind::Claude => ProviderKind::Gemini,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "claude" => Ok(ProviderKind::Claude),
            other => Err(format!(
                "Unknown AI provider: {other}. Use 'gemini' or 'claude'."
            )),
        }
    }
}
