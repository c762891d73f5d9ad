//! Text-generation providers.
//!
//! Each provider is a stateless capability: one request in, one response
//! out. Retries and fallback belong to the diagram generator.

use crate::models::ProviderKind;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request timed out")]
    Timeout { provider: ProviderKind },
    #[error("{provider} request failed: {source}")]
    Request {
        provider: ProviderKind,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned error {status}: {body}")]
    Status {
        provider: ProviderKind,
        status: u16,
        body: String,
    },
    #[error("{provider} returned an invalid response: {reason}")]
    InvalidResponse {
        provider: ProviderKind,
        reason: String,
    },
    #[error("{} API key not configured", .0.display_name())]
    NotConfigured(ProviderKind),
}

impl ProviderError {
    fn from_reqwest(provider: ProviderKind, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ProviderError::Timeout { provider }
        } else {
            ProviderError::Request { provider, source }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiResponse {
    pub text: String,
    pub usage: TokenUsage,
}

/// Per-million-token prices in USD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenRates {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl TokenRates {
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 / 1_000_000.0) * self.input_per_million
            + (output_tokens as f64 / 1_000_000.0) * self.output_per_million
    }
}

pub const GEMINI_RATES: TokenRates = TokenRates {
    input_per_million: 0.075,
    output_per_million: 0.30,
};

pub const CLAUDE_RATES: TokenRates = TokenRates {
    input_per_million: 3.0,
    output_per_million: 15.0,
};

/// A text-generation backend.
#[async_trait]
pub trait AiProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Generate text for `prompt` under an optional system prompt.
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: u32,
    ) -> Result<AiResponse, ProviderError>;

    /// Estimated USD cost of a call with these token counts.
    fn calculate_cost(&self, input_tokens: u64, output_tokens: u64) -> f64;
}

/// Connection settings shared by the HTTP-backed providers.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

fn build_client(provider: ProviderKind, timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| ProviderError::Request { provider, source })
}

async fn read_json<T: serde::de::DeserializeOwned>(
    provider: ProviderKind,
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            provider,
            status,
            body,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::InvalidResponse {
            provider,
            reason: e.to_string(),
        })
}

/// Google Gemini `generateContent` API.
pub struct GeminiProvider {
    client: Client,
    settings: ProviderSettings,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

impl GeminiProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        let client = build_client(ProviderKind::Gemini, settings.timeout)?;
        Ok(Self { client, settings })
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: u32,
    ) -> Result<AiResponse, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        );

        let mut request_body = json!({
            "contents": [
                {"role": "user", "parts": [{"text": prompt}]}
            ],
            "generationConfig": {"maxOutputTokens": max_tokens}
        });
        if let Some(system) = system_prompt {
            request_body["systemInstruction"] = json!({"parts": [{"text": system}]});
        }

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(ProviderKind::Gemini, e))?;

        let body: GeminiResponse = read_json(ProviderKind::Gemini, response).await?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: ProviderKind::Gemini,
                reason: "response has no candidates".to_string(),
            })?;

        let usage = body.usage_metadata.unwrap_or_default();
        Ok(AiResponse {
            text,
            usage: TokenUsage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            },
        })
    }

    fn calculate_cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        GEMINI_RATES.cost(input_tokens, output_tokens)
    }
}

/// Anthropic Messages API.
pub struct ClaudeProvider {
    client: Client,
    settings: ProviderSettings,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ClaudeContentBlock>,
    usage: Option<ClaudeUsage>,
}

#[derive(Deserialize)]
struct ClaudeContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Deserialize, Default)]
struct ClaudeUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

impl ClaudeProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        let client = build_client(ProviderKind::Claude, settings.timeout)?;
        Ok(Self { client, settings })
    }
}

#[async_trait]
impl AiProvider for ClaudeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Claude
    }

    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: u32,
    ) -> Result<AiResponse, ProviderError> {
        let url = format!("{}/messages", self.settings.base_url.trim_end_matches('/'));

        let mut request_body = json!({
            "model": self.settings.model,
            "max_tokens": max_tokens,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });
        if let Some(system) = system_prompt {
            request_body["system"] = json!(system);
        }

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(ProviderKind::Claude, e))?;

        let body: ClaudeResponse = read_json(ProviderKind::Claude, response).await?;

        // Only the first block counts; a non-text first block yields empty text.
        let first = body
            .content
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: ProviderKind::Claude,
                reason: "response has no content blocks".to_string(),
            })?;
        let text = if first.block_type == "text" {
            first.text.unwrap_or_default()
        } else {
            String::new()
        };

        let usage = body.usage.unwrap_or_default();
        Ok(AiResponse {
            text,
            usage: TokenUsage {
                input_tokens: usage.input_tokens,
                output_tokens: usage.output_tokens,
            },
        })
    }

    fn calculate_cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        CLAUDE_RATES.cost(input_tokens, output_tokens)
    }
}

/// Closed set of vendor implementations, resolved once at startup.
pub enum ProviderClient {
    Gemini(GeminiProvider),
    Claude(ClaudeProvider),
}

impl ProviderClient {
    pub fn new(kind: ProviderKind, settings: ProviderSettings) -> Result<Self, ProviderError> {
        if settings.api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured(kind));
        }
        Ok(match kind {
            ProviderKind::Gemini => ProviderClient::Gemini(GeminiProvider::new(settings)?),
            ProviderKind::Claude => ProviderClient::Claude(ClaudeProvider::new(settings)?),
        })
    }
}

#[async_trait]
impl AiProvider for ProviderClient {
    fn kind(&self) -> ProviderKind {
        match self {
            ProviderClient::Gemini(p) => p.kind(),
            ProviderClient::Claude(p) => p.kind(),
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: u32,
    ) -> Result<AiResponse, ProviderError> {
        match self {
            ProviderClient::Gemini(p) => p.generate(prompt, system_prompt, max_tokens).await,
            ProviderClient::Claude(p) => p.generate(prompt, system_prompt, max_tokens).await,
        }
    }

    fn calculate_cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        match self {
            ProviderClient::Gemini(p) => p.calculate_cost(input_tokens, output_tokens),
            ProviderClient::Claude(p) => p.calculate_cost(input_tokens, output_tokens),
        }
    }
}
