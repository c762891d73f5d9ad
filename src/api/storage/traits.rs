//! Storage trait definitions for the durable diagram log.

use super::StorageError;
use crate::models::{DiagramRecord, DiagramStats, RecentDiagram};

/// Append-only log of generated diagrams, read only for reporting.
#[async_trait::async_trait]
pub trait DiagramLog: Send + Sync {
    /// Append one record. Records are never updated or deleted.
    async fn append(&self, record: &DiagramRecord) -> Result<(), StorageError>;

    /// Per-type counts and durations over the trailing `window_days`.
    async fn stats(&self, window_days: u32) -> Result<DiagramStats, StorageError>;

    /// Most recent `limit` records, newest first.
    async fn recent(&self, limit: u32) -> Result<Vec<RecentDiagram>, StorageError>;

    /// Cheap liveness check for health reporting.
    async fn ping(&self) -> Result<(), StorageError>;
}
