//! SQLite-backed diagram log.

use super::{DiagramLog, StorageError};
use crate::models::{DiagramRecord, DiagramStats, RecentDiagram, TypeStats};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Timestamp layout shared with SQLite's `datetime()` so that string
/// comparison orders rows chronologically.
const SQLITE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(SQLITE_TIMESTAMP).to_string()
}

/// Diagram log stored in a single SQLite file.
pub struct SqliteDiagramLog {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDiagramLog {
    /// Open (or create) the database at `db_path`, creating parent directories.
    pub fn open(db_path: &Path) -> Result<Self, StorageError> {
        if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| {
                StorageError::ConnectionError(format!(
                    "Failed to create database directory {:?}: {}",
                    dir, e
                ))
            })?;
        }

        let conn = Connection::open(db_path).map_err(|e| {
            StorageError::ConnectionError(format!(
                "Failed to open database {:?}: {}",
                db_path, e
            ))
        })?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;

        let log = Self::from_connection(conn)?;
        info!("Database initialized: {:?}", db_path);
        Ok(log)
    }

    /// In-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::ConnectionError(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking closure against the connection off the async runtime.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StorageError::Other("database lock poisoned".to_string()))?;
            f(&guard).map_err(StorageError::from)
        })
        .await
        .map_err(|e| StorageError::Other(format!("database task failed: {}", e)))?
    }
}

fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS diagrams (
            id TEXT PRIMARY KEY,
            type TEXT NOT NULL,
            prompt TEXT NOT NULL,
            code TEXT NOT NULL,
            provider TEXT NOT NULL,
            attempts INTEGER NOT NULL DEFAULT 1,
            duration INTEGER NOT NULL,
            cached INTEGER DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
        CREATE INDEX IF NOT EXISTS idx_diagrams_type ON diagrams(type);
        CREATE INDEX IF NOT EXISTS idx_diagrams_created_at ON diagrams(created_at DESC);",
    )?;
    Ok(())
}

#[async_trait::async_trait]
impl DiagramLog for SqliteDiagramLog {
    async fn append(&self, record: &DiagramRecord) -> Result<(), StorageError> {
        let record = record.clone();
        self.with_conn(move |conn| {
            let created_at = format_timestamp(&record.created_at);
            conn.execute(
                "INSERT INTO diagrams (
                    id, type, prompt, code, provider, attempts, duration, cached, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    record.id,
                    record.diagram_type.as_str(),
                    record.prompt,
                    record.code,
                    record.provider.as_str(),
                    record.attempts as i64,
                    record.duration as i64,
                    record.cached,
                    created_at,
                    created_at,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn stats(&self, window_days: u32) -> Result<DiagramStats, StorageError> {
        self.with_conn(move |conn| {
            let window = format!("-{} days", window_days);

            let mut stmt = conn.prepare(
                "SELECT
                    type,
                    COUNT(*) AS count,
                    AVG(duration) AS avg_duration,
                    MIN(duration) AS min_duration,
                    MAX(duration) AS max_duration
                FROM diagrams
                WHERE created_at > datetime('now', ?1)
                GROUP BY type
                ORDER BY count DESC, type ASC",
            )?;
            let by_type = stmt
                .query_map(params![window], |row| {
                    Ok(TypeStats {
                        diagram_type: row.get("type")?,
                        count: row.get::<_, i64>("count")? as u64,
                        avg_duration: row.get("avg_duration")?,
                        min_duration: row.get::<_, i64>("min_duration")? as u64,
                        max_duration: row.get::<_, i64>("max_duration")? as u64,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let total: i64 = conn.query_row(
                "SELECT COUNT(*) FROM diagrams WHERE created_at > datetime('now', ?1)",
                params![window],
                |row| row.get(0),
            )?;

            Ok(DiagramStats {
                period: format!("{} days", window_days),
                total: total as u64,
                by_type,
            })
        })
        .await
    }

    async fn recent(&self, limit: u32) -> Result<Vec<RecentDiagram>, StorageError> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, type, duration, created_at
                FROM diagrams
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?1",
            )?;
            let rows = stmt
                .query_map(params![limit as i64], |row| {
                    Ok(RecentDiagram {
                        id: row.get("id")?,
                        diagram_type: row.get("type")?,
                        duration: row.get::<_, i64>("duration")? as u64,
                        created_at: row.get("created_at")?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.with_conn(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)))
            .await
            .map(|_| ())
    }
}
