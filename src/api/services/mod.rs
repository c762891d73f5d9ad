//! Services module - generation pipeline and its supporting services.

pub mod ai_service;
pub mod cache_service;
pub mod diagram_generator;
pub mod diagram_service;
pub mod mermaid;
pub mod prompt_catalog;

// Re-export for convenience
pub use ai_service::{
    AiProvider, AiResponse, ClaudeProvider, GeminiProvider, ProviderClient, ProviderError,
    ProviderSettings, TokenUsage,
};
pub use cache_service::{CacheService, CacheStats, cache_key};
pub use diagram_generator::{DiagramGenerator, GenerationError, GenerationOutcome, RetryPolicy};
pub use diagram_service::{DiagramCache, DiagramService, DiagramServiceError};
pub use prompt_catalog::{CatalogError, DiagramConfig, FewShotExample, PromptCatalog};
