//! Process configuration, read once at startup from flags and environment.

use crate::models::ProviderKind;
use crate::services::ai_service::{
    DEFAULT_ANTHROPIC_BASE_URL, DEFAULT_CLAUDE_MODEL, DEFAULT_GEMINI_BASE_URL,
    DEFAULT_GEMINI_MODEL, DEFAULT_MAX_TOKENS, ProviderSettings,
};
use axum::http::HeaderValue;
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "snapchart-api")]
#[command(about = "Natural-language to Mermaid diagram generation API")]
pub struct Config {
    /// Primary text-generation provider
    #[arg(long, env = "AI_PROVIDER", value_enum, ignore_case = true, default_value = "gemini")]
    pub ai_provider: ProviderKind,

    /// Google Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub anthropic_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    #[arg(long, env = "CLAUDE_MODEL", default_value = DEFAULT_CLAUDE_MODEL)]
    pub claude_model: String,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
    pub gemini_base_url: String,

    #[arg(long, env = "ANTHROPIC_BASE_URL", default_value = DEFAULT_ANTHROPIC_BASE_URL)]
    pub anthropic_base_url: String,

    /// Per-call provider timeout in seconds
    #[arg(long, env = "PROVIDER_TIMEOUT_SECS", default_value = "60")]
    pub provider_timeout_secs: u64,

    /// Output token budget per provider call
    #[arg(long, env = "MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// HTTP listen port
    #[arg(long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Allowed browser origin
    #[arg(long, env = "CORS_ORIGIN", default_value = "http://localhost:5173")]
    pub cors_origin: String,

    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "./data/snapchart.db")]
    pub database_path: PathBuf,

    /// Cache time-to-live in seconds
    #[arg(long, env = "CACHE_TTL_SECS", default_value = "86400")]
    pub cache_ttl_secs: u64,

    /// Interval between cache sweeps in seconds
    #[arg(long, env = "CACHE_SWEEP_INTERVAL_SECS", default_value = "60")]
    pub cache_sweep_interval_secs: u64,

    /// Generation requests allowed per minute
    #[arg(long, env = "RATE_LIMIT_PER_MINUTE", default_value = "60")]
    pub rate_limit_per_minute: u32,

    /// Deployment environment reported by /health
    #[arg(long, env = "APP_ENV", default_value = "development")]
    pub environment: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, ignore_case = true, default_value = "text")]
    pub log_format: LogFormat,

    /// Built web client to serve for non-API routes
    #[arg(long, env = "FRONTEND_DIR")]
    pub frontend_dir: Option<PathBuf>,
}

impl Config {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_secs)
    }

    /// API key for `kind`, ignoring blank values.
    pub fn credential_for(&self, kind: ProviderKind) -> Option<&str> {
        let key = match kind {
            ProviderKind::Gemini => self.gemini_api_key.as_deref(),
            ProviderKind::Claude => self.anthropic_api_key.as_deref(),
        };
        key.map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn primary_credential(&self) -> Option<&str> {
        self.credential_for(self.ai_provider)
    }

    /// Connection settings for `kind`, or `None` when its key is missing.
    pub fn provider_settings(&self, kind: ProviderKind) -> Option<ProviderSettings> {
        let api_key = self.credential_for(kind)?.to_string();
        let (model, base_url) = match kind {
            ProviderKind::Gemini => (&self.gemini_model, &self.gemini_base_url),
            ProviderKind::Claude => (&self.claude_model, &self.anthropic_base_url),
        };
        Some(ProviderSettings {
            api_key,
            model: model.clone(),
            base_url: base_url.clone(),
            timeout: self.provider_timeout(),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cache_ttl_secs == 0 {
            anyhow::bail!("CACHE_TTL_SECS must be greater than zero");
        }
        if self.cache_sweep_interval_secs == 0 {
            anyhow::bail!("CACHE_SWEEP_INTERVAL_SECS must be greater than zero");
        }
        if self.rate_limit_per_minute == 0 {
            anyhow::bail!("RATE_LIMIT_PER_MINUTE must be greater than zero");
        }
        if self.provider_timeout_secs == 0 {
            anyhow::bail!("PROVIDER_TIMEOUT_SECS must be greater than zero");
        }
        HeaderValue::from_str(&self.cors_origin)
            .map_err(|e| anyhow::anyhow!("Invalid CORS_ORIGIN {:?}: {}", self.cors_origin, e))?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ai_provider: ProviderKind::Gemini,
            gemini_api_key: None,
            anthropic_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            claude_model: DEFAULT_CLAUDE_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            provider_timeout_secs: 60,
            max_tokens: DEFAULT_MAX_TOKENS,
            port: 8080,
            cors_origin: "http://localhost:5173".to_string(),
            database_path: PathBuf::from("./data/snapchart.db"),
            cache_ttl_secs: 86_400,
            cache_sweep_interval_secs: 60,
            rate_limit_per_minute: 60,
            environment: "development".to_string(),
            log_format: LogFormat::Text,
            frontend_dir: None,
        }
    }
}
