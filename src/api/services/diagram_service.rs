//! Request handling for diagram generation: cache lookup, generation on
//! miss, cache write and best-effort logging.

use super::cache_service::{CacheService, cache_key};
use super::diagram_generator::{DiagramGenerator, GenerationError};
use crate::models::{DiagramRecord, DiagramRequest, GenerateResponse, ProviderKind};
use crate::storage::DiagramLog;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

pub type DiagramCache = CacheService<GenerateResponse>;

#[derive(Debug, Error)]
pub enum DiagramServiceError {
    /// Server-side setup problem; not correctable by the client.
    #[error("{0}")]
    Configuration(String),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

pub struct DiagramService {
    cache: Arc<DiagramCache>,
    log: Arc<dyn DiagramLog>,
    generator: Option<Arc<DiagramGenerator>>,
    primary: ProviderKind,
    cache_ttl_secs: u64,
}

impl DiagramService {
    /// `generator` is `None` when the primary provider has no credential;
    /// cache hits are still served in that case.
    pub fn new(
        cache: Arc<DiagramCache>,
        log: Arc<dyn DiagramLog>,
        generator: Option<Arc<DiagramGenerator>>,
        primary: ProviderKind,
        cache_ttl_secs: u64,
    ) -> Self {
        Self {
            cache,
            log,
            generator,
            primary,
            cache_ttl_secs,
        }
    }

    pub fn is_generation_enabled(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn generate(
        &self,
        request: &DiagramRequest,
    ) -> Result<GenerateResponse, DiagramServiceError> {
        let key = cache_key(request.diagram_type, &request.prompt);

        if let Some(mut hit) = self.cache.get(&key).await {
            info!("Cache hit: {}", key);
            hit.cached = true;
            return Ok(hit);
        }

        let generator = self.generator.as_ref().ok_or_else(|| {
            DiagramServiceError::Configuration(format!(
                "{} API key not configured",
                self.primary.display_name()
            ))
        })?;

        let started = Instant::now();
        let outcome = generator
            .generate(request.diagram_type, &request.prompt)
            .await?;
        let duration = started.elapsed().as_millis() as u64;

        let response = GenerateResponse {
            id: Uuid::new_v4().to_string(),
            diagram_type: request.diagram_type,
            code: outcome.code,
            duration,
            provider: outcome.provider,
            attempts: outcome.attempts,
            cached: false,
            timestamp: Utc::now(),
        };

        self.cache
            .set_with_ttl(key, response.clone(), self.cache_ttl_secs)
            .await;

        let record = DiagramRecord::from_response(&response, &request.prompt);
        if let Err(e) = self.log.append(&record).await {
            error!("Failed to save diagram {} to database: {}", response.id, e);
        }

        Ok(response)
    }
}
