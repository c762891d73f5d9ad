//! Post-processing and shape checks for generated Mermaid markup.
//!
//! The shape check is a keyword heuristic, not a grammar. The keyword table
//! is fixed; callers rely on its exact accept/reject behavior.

use crate::models::DiagramType;
use regex::Regex;
use std::sync::LazyLock;

/// Generated text shorter than this is rejected outright.
pub const MIN_CODE_LEN: usize = 10;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```[a-z0-9_+-]*[ \t]*\r?\n?").expect("valid fence regex"));

/// Remove markdown code fences, trim every line and drop blank lines.
///
/// Idempotent: cleaning already-clean text returns it unchanged.
pub fn clean_code(text: &str) -> String {
    let unfenced = CODE_FENCE.replace_all(text.trim(), "");

    unfenced
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keywords of which at least one must appear for output of this type.
pub fn valid_starts(diagram_type: DiagramType) -> &'static [&'static str] {
    match diagram_type {
        DiagramType::Flowchart => &["flowchart TD", "flowchart LR", "flowchart"],
        DiagramType::Sequence => &["sequenceDiagram"],
        DiagramType::Pie => &["pie"],
        DiagramType::Gantt => &["gantt"],
        DiagramType::EntityRelationship => &["erDiagram"],
        DiagramType::State => &["stateDiagram"],
        DiagramType::Journey => &["journey"],
        DiagramType::Graph => &["graph TD", "graph LR", "graph"],
    }
}

/// Why a piece of generated text was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    TooShort { len: usize },
    MissingKeyword { diagram_type: DiagramType },
}

impl std::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeError::TooShort { len } => {
                write!(f, "generated code too short ({len} < {MIN_CODE_LEN} characters)")
            }
            ShapeError::MissingKeyword { diagram_type } => write!(
                f,
                "generated code has no {} keyword (expected one of: {})",
                diagram_type,
                valid_starts(*diagram_type).join(", ")
            ),
        }
    }
}

impl std::error::Error for ShapeError {}

/// Check cleaned code against the length floor and the keyword table.
/// Keyword matching is a case-insensitive substring test.
pub fn check_shape(code: &str, diagram_type: DiagramType) -> Result<(), ShapeError> {
    let len = code.chars().count();
    if len < MIN_CODE_LEN {
        return Err(ShapeError::TooShort { len });
    }

    let lowered = code.to_lowercase();
    let found = valid_starts(diagram_type)
        .iter()
        .any(|keyword| lowered.contains(&keyword.to_lowercase()));

    if found {
        Ok(())
    } else {
        Err(ShapeError::MissingKeyword { diagram_type })
    }
}

pub fn is_valid_code(code: &str, diagram_type: DiagramType) -> bool {
    check_shape(code, diagram_type).is_ok()
}
