//! Shared test doubles for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use snapchart_api::models::{DiagramRecord, DiagramStats, ProviderKind, RecentDiagram};
use snapchart_api::services::ai_service::{CLAUDE_RATES, GEMINI_RATES};
use snapchart_api::services::{AiProvider, AiResponse, ProviderError, TokenUsage};
use snapchart_api::storage::{DiagramLog, StorageError};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One scripted provider reply.
#[derive(Debug, Clone)]
pub enum Step {
    Reply(String),
    Fail(u16),
}

pub fn reply(text: &str) -> Step {
    Step::Reply(text.to_string())
}

/// Provider that plays back a fixed script. Once the script runs out every
/// call fails with 503.
pub struct ScriptedProvider {
    kind: ProviderKind,
    script: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    system_prompts: Mutex<Vec<Option<String>>>,
    usage: TokenUsage,
}

impl ScriptedProvider {
    pub fn new(kind: ProviderKind, steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            kind,
            script: Mutex::new(steps.into_iter().collect()),
            calls: AtomicUsize::new(0),
            system_prompts: Mutex::new(Vec::new()),
            usage: TokenUsage {
                input_tokens: 1_000,
                output_tokens: 500,
            },
        }
    }

    pub fn always_failing(kind: ProviderKind) -> Self {
        Self::new(kind, [])
    }

    pub fn with_usage(mut self, input_tokens: u64, output_tokens: u64) -> Self {
        self.usage = TokenUsage {
            input_tokens,
            output_tokens,
        };
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_system_prompt(&self) -> Option<String> {
        self.system_prompts.lock().unwrap().last().cloned().flatten()
    }
}

#[async_trait]
impl AiProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn generate(
        &self,
        _prompt: &str,
        system_prompt: Option<&str>,
        _max_tokens: u32,
    ) -> Result<AiResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.system_prompts
            .lock()
            .unwrap()
            .push(system_prompt.map(str::to_string));

        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(text)) => Ok(AiResponse {
                text,
                usage: self.usage,
            }),
            Some(Step::Fail(status)) => Err(ProviderError::Status {
                provider: self.kind,
                status,
                body: "scripted failure".to_string(),
            }),
            None => Err(ProviderError::Status {
                provider: self.kind,
                status: 503,
                body: "script exhausted".to_string(),
            }),
        }
    }

    fn calculate_cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        match self.kind {
            ProviderKind::Gemini => GEMINI_RATES.cost(input_tokens, output_tokens),
            ProviderKind::Claude => CLAUDE_RATES.cost(input_tokens, output_tokens),
        }
    }
}

/// Diagram log whose every operation fails.
pub struct BrokenLog;

#[async_trait]
impl DiagramLog for BrokenLog {
    async fn append(&self, _record: &DiagramRecord) -> Result<(), StorageError> {
        Err(StorageError::QueryError("disk I/O error".to_string()))
    }

    async fn stats(&self, _window_days: u32) -> Result<DiagramStats, StorageError> {
        Err(StorageError::QueryError("disk I/O error".to_string()))
    }

    async fn recent(&self, _limit: u32) -> Result<Vec<RecentDiagram>, StorageError> {
        Err(StorageError::QueryError("disk I/O error".to_string()))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Err(StorageError::ConnectionError("database is locked".to_string()))
    }
}
