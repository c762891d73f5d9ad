// Models module - request/response types, enums and durable log rows

pub mod diagram;
#[path = "enums.rs"]
pub mod enums;
pub mod record;

pub use diagram::{
    DiagramRequest, GenerateRequestBody, GenerateResponse, MAX_PROMPT_CHARS, ValidationIssue,
    validate_prompt,
};
pub use enums::{DiagramType, ParseDiagramTypeError, ProviderKind};
pub use record::{DiagramRecord, DiagramStats, RecentDiagram, RecentDiagrams, TypeStats};
