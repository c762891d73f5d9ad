//! Diagram generation pipeline.
//!
//! Per request: look up the prompt configuration, then try the primary
//! provider up to `max_attempts` times with exponential backoff, then the
//! fallback provider exactly once. Each attempt's output is cleaned and
//! shape-checked; a bad shape counts the same as a provider error.

use super::ai_service::{AiProvider, DEFAULT_MAX_TOKENS, ProviderError, TokenUsage};
use super::mermaid::{self, ShapeError};
use super::prompt_catalog::{CatalogError, PromptCatalog};
use crate::models::{DiagramType, ProviderKind};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// Bounded retry schedule for the primary provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay after failed `attempt` (1-based): `base_delay * 2^(attempt-1)`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// Why one attempt did not produce usable markup.
#[derive(Debug, Error)]
pub enum AttemptFailure {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("{provider} generated invalid code: {reason}")]
    InvalidOutput {
        provider: ProviderKind,
        reason: ShapeError,
    },
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    UnknownDiagramType(#[from] CatalogError),
    #[error("All generation attempts failed: {last_failure}")]
    Exhausted { last_failure: String },
}

/// Successful generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub code: String,
    pub provider: ProviderKind,
    /// Attempt number on the provider that succeeded. The fallback counts
    /// its own single attempt.
    pub attempts: u32,
    pub usage: TokenUsage,
    pub estimated_cost_usd: f64,
}

/// Orchestrates prompt construction, retries and fallback.
pub struct DiagramGenerator {
    catalog: PromptCatalog,
    primary: Arc<dyn AiProvider>,
    fallback: Option<Arc<dyn AiProvider>>,
    retry: RetryPolicy,
    max_tokens: u32,
}

impl DiagramGenerator {
    pub fn new(catalog: PromptCatalog, primary: Arc<dyn AiProvider>) -> Self {
        Self {
            catalog,
            primary,
            fallback: None,
            retry: RetryPolicy::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn AiProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn primary_kind(&self) -> ProviderKind {
        self.primary.kind()
    }

    pub fn fallback_kind(&self) -> Option<ProviderKind> {
        self.fallback.as_ref().map(|p| p.kind())
    }

    /// Run the pipeline for one request.
    pub async fn generate(
        &self,
        diagram_type: DiagramType,
        prompt: &str,
    ) -> Result<GenerationOutcome, GenerationError> {
        let system_prompt = self.catalog.build_prompt(diagram_type)?;
        let mut last_failure: Option<AttemptFailure> = None;

        let max_attempts = self.retry.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self
                .attempt(self.primary.as_ref(), diagram_type, &system_prompt, prompt)
                .await
            {
                Ok((code, usage)) => {
                    return Ok(self.outcome(self.primary.as_ref(), code, usage, attempt));
                }
                Err(failure) => {
                    warn!(
                        "{} attempt {}/{} failed: {}",
                        self.primary.kind().display_name(),
                        attempt,
                        max_attempts,
                        failure
                    );
                    last_failure = Some(failure);
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.retry.backoff_for(attempt)).await;
            }
        }

        if let Some(fallback) = &self.fallback {
            info!("Falling back to {}", fallback.kind().display_name());
            match self
                .attempt(fallback.as_ref(), diagram_type, &system_prompt, prompt)
                .await
            {
                Ok((code, usage)) => return Ok(self.outcome(fallback.as_ref(), code, usage, 1)),
                Err(failure) => {
                    error!("{} fallback failed: {}", fallback.kind().display_name(), failure);
                    last_failure = Some(failure);
                }
            }
        }

        let last_failure = last_failure
            .map(|f| f.to_string())
            .unwrap_or_else(|| "no attempts were made".to_string());
        error!("Diagram generation exhausted for type {}: {}", diagram_type, last_failure);
        Err(GenerationError::Exhausted { last_failure })
    }

    async fn attempt(
        &self,
        provider: &dyn AiProvider,
        diagram_type: DiagramType,
        system_prompt: &str,
        prompt: &str,
    ) -> Result<(String, TokenUsage), AttemptFailure> {
        let response = provider
            .generate(prompt, Some(system_prompt), self.max_tokens)
            .await?;

        let code = mermaid::clean_code(&response.text);
        mermaid::check_shape(&code, diagram_type).map_err(|reason| {
            AttemptFailure::InvalidOutput {
                provider: provider.kind(),
                reason,
            }
        })?;

        Ok((code, response.usage))
    }

    fn outcome(
        &self,
        provider: &dyn AiProvider,
        code: String,
        usage: TokenUsage,
        attempts: u32,
    ) -> GenerationOutcome {
        let estimated_cost_usd = provider.calculate_cost(usage.input_tokens, usage.output_tokens);
        info!(
            "{} generated diagram on attempt {} ({} in / {} out tokens, ~${:.6})",
            provider.kind().display_name(),
            attempts,
            usage.input_tokens,
            usage.output_tokens,
            estimated_cost_usd
        );
        GenerationOutcome {
            code,
            provider: provider.kind(),
            attempts,
            usage,
            estimated_cost_usd,
        }
    }
}
