//! In-memory TTL cache for generated diagrams.
//!
//! Entries expire on read and are swept periodically by a background task.
//! There is no size-based eviction. A shared cache (e.g. Redis) can replace
//! this behind the same interface.

use crate::models::DiagramType;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

/// Default time-to-live: 24 hours.
pub const DEFAULT_TTL_SECS: u64 = 86_400;

/// Default interval between background sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Deterministic fingerprint of a (type, prompt) pair.
///
/// The prompt is trimmed first, so surrounding whitespace never produces a
/// distinct key. SHA-256, hex encoded.
pub fn cache_key(diagram_type: DiagramType, prompt: &str) -> String {
    let input = format!("{}:{}", diagram_type.as_str(), prompt.trim());
    hex::encode(Sha256::digest(input.as_bytes()))
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Snapshot of the cache contents for health checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

type Entries<V> = Arc<Mutex<HashMap<String, CacheEntry<V>>>>;

/// Key/value cache with per-entry expiry.
pub struct CacheService<V> {
    entries: Entries<V>,
    sweeper: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl<V> CacheService<V>
where
    V: Clone + Send + 'static,
{
    /// Create an empty cache. The sweeper is not running until
    /// [`start_cleanup`](Self::start_cleanup) is called.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            sweeper: std::sync::Mutex::new(None),
        }
    }

    /// Look up a value. An expired entry is removed and reported as absent.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                debug!("Cache entry expired on read: {}", key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    /// Store a value with the default 24 hour TTL.
    pub async fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, DEFAULT_TTL_SECS).await;
    }

    /// Store a value, replacing any existing entry wholesale.
    pub async fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl_secs: u64) {
        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(ttl_secs))
            .unwrap_or_else(|| now + Duration::from_secs(DEFAULT_TTL_SECS * 365 * 100));
        self.entries
            .lock()
            .await
            .insert(key.into(), CacheEntry { value, expires_at });
    }

    pub async fn delete(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    /// Remove every entry, expired or not.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
        info!("Cache cleared");
    }

    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().await;
        CacheStats {
            size: entries.len(),
            keys: entries.keys().cloned().collect(),
        }
    }

    /// Evict all expired entries now. Returns how many were removed.
    pub async fn sweep(&self) -> usize {
        sweep_entries(&self.entries).await
    }

    /// Spawn the periodic sweeper on the current tokio runtime.
    ///
    /// Calling this while a sweeper is already running replaces it.
    pub fn start_cleanup(&self, interval: Duration) {
        let entries = Arc::clone(&self.entries);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = sweep_entries(&entries).await;
                if removed > 0 {
                    debug!("Cache sweep evicted {} expired entries", removed);
                }
            }
        });

        if let Ok(mut sweeper) = self.sweeper.lock() {
            if let Some(previous) = sweeper.replace(handle) {
                previous.abort();
            }
        }
    }

    /// Stop the periodic sweeper, if running.
    pub fn stop_cleanup(&self) {
        if let Ok(mut sweeper) = self.sweeper.lock() {
            if let Some(handle) = sweeper.take() {
                handle.abort();
            }
        }
    }
}

impl<V> Default for CacheService<V>
where
    V: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Drop for CacheService<V> {
    fn drop(&mut self) {
        if let Ok(mut sweeper) = self.sweeper.lock() {
            if let Some(handle) = sweeper.take() {
                handle.abort();
            }
        }
    }
}

async fn sweep_entries<V>(entries: &Entries<V>) -> usize {
    let mut entries = entries.lock().await;
    let now = Instant::now();
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    before - entries.len()
}
