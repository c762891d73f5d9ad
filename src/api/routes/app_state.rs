//! Application state management.
//!
//! Defines the AppState struct that holds all shared application state: the
//! diagram cache, the durable log, the generation service and the rate
//! limiter. Built once at startup and torn down at shutdown.

use crate::config::Config;
use crate::middleware::{RateLimiterState, create_rate_limiter};
use crate::services::{
    AiProvider, DiagramCache, DiagramGenerator, DiagramService, PromptCatalog, ProviderClient,
    RetryPolicy,
};
use crate::storage::{DiagramLog, SqliteDiagramLog};
use std::sync::Arc;
use tracing::{info, warn};

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Generated diagrams keyed by request fingerprint
    pub cache: Arc<DiagramCache>,
    /// Append-only record of generated diagrams
    pub diagram_log: Arc<dyn DiagramLog>,
    pub diagrams: Arc<DiagramService>,
    /// Quota for provider-backed requests
    pub rate_limiter: RateLimiterState,
}

impl AppState {
    /// Build production state: open the database, resolve providers and
    /// start the cache sweeper. Must run inside a tokio runtime.
    pub async fn init(config: Config) -> anyhow::Result<Self> {
        config.validate()?;

        let diagram_log: Arc<dyn DiagramLog> =
            Arc::new(SqliteDiagramLog::open(&config.database_path)?);
        let generator = build_generator(&config)?;

        let state = Self::from_parts(config, diagram_log, generator);
        state
            .cache
            .start_cleanup(state.config.cache_sweep_interval());
        Ok(state)
    }

    /// Assemble state from already-built components. The cache sweeper is
    /// not started.
    pub fn from_parts(
        config: Config,
        diagram_log: Arc<dyn DiagramLog>,
        generator: Option<DiagramGenerator>,
    ) -> Self {
        let cache = Arc::new(DiagramCache::new());
        let diagrams = Arc::new(DiagramService::new(
            Arc::clone(&cache),
            Arc::clone(&diagram_log),
            generator.map(Arc::new),
            config.ai_provider,
            config.cache_ttl_secs,
        ));
        let rate_limiter = create_rate_limiter(config.rate_limit_per_minute);

        Self {
            config: Arc::new(config),
            cache,
            diagram_log,
            diagrams,
            rate_limiter,
        }
    }

    /// Stop background work. Safe to call more than once.
    pub async fn shutdown(&self) {
        self.cache.stop_cleanup();
        info!("Application state shut down");
    }
}

/// Resolve the configured providers into a generator.
///
/// Returns `None` when the primary provider has no credential. The other
/// vendor becomes the fallback when its credential is present.
pub fn build_generator(config: &Config) -> anyhow::Result<Option<DiagramGenerator>> {
    let primary_kind = config.ai_provider;
    let Some(primary_settings) = config.provider_settings(primary_kind) else {
        warn!(
            "{} API key not configured; diagram generation disabled",
            primary_kind.display_name()
        );
        return Ok(None);
    };

    let primary: Arc<dyn AiProvider> = Arc::new(ProviderClient::new(primary_kind, primary_settings)?);
    let mut generator = DiagramGenerator::new(PromptCatalog::builtin(), primary)
        .with_retry_policy(RetryPolicy::default())
        .with_max_tokens(config.max_tokens);

    let fallback_kind = primary_kind.other();
    match config.provider_settings(fallback_kind) {
        Some(settings) => {
            let fallback: Arc<dyn AiProvider> = Arc::new(ProviderClient::new(fallback_kind, settings)?);
            generator = generator.with_fallback(fallback);
            info!(
                "Primary provider: {}, fallback: {}",
                primary_kind.display_name(),
                fallback_kind.display_name()
            );
        }
        None => info!(
            "Primary provider: {} ({} fallback not configured)",
            primary_kind.display_name(),
            fallback_kind.display_name()
        ),
    }

    Ok(Some(generator))
}
