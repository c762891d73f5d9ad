//! Unit tests for the TTL cache and cache key derivation.

use snapchart_api::models::DiagramType;
use snapchart_api::services::{CacheService, cache_key};
use std::time::Duration;

#[tokio::test]
async fn test_set_then_get_returns_value() {
    let cache: CacheService<String> = CacheService::new();
    cache.set("k1", "value".to_string()).await;

    assert_eq!(cache.get("k1").await, Some("value".to_string()));
    assert_eq!(cache.get("missing").await, None);
}

#[tokio::test(start_paused = true)]
async fn test_entry_expires_after_ttl() {
    let cache: CacheService<String> = CacheService::new();
    cache.set_with_ttl("short", "v".to_string(), 1).await;

    tokio::time::advance(Duration::from_millis(900)).await;
    assert_eq!(cache.get("short").await, Some("v".to_string()));

    tokio::time::advance(Duration::from_millis(200)).await;
    assert_eq!(cache.get("short").await, None);

    // Expired entries are evicted on read
    assert_eq!(cache.stats().await.size, 0);
}

#[tokio::test(start_paused = true)]
async fn test_default_ttl_is_one_day() {
    let cache: CacheService<u32> = CacheService::new();
    cache.set("day", 7).await;

    tokio::time::advance(Duration::from_secs(86_400 - 60)).await;
    assert_eq!(cache.get("day").await, Some(7));

    tokio::time::advance(Duration::from_secs(120)).await;
    assert_eq!(cache.get("day").await, None);
}

#[tokio::test(start_paused = true)]
async fn test_set_replaces_value_and_expiry() {
    let cache: CacheService<&'static str> = CacheService::new();
    cache.set_with_ttl("k", "old", 1).await;
    cache.set_with_ttl("k", "new", 10).await;

    tokio::time::advance(Duration::from_secs(5)).await;
    assert_eq!(cache.get("k").await, Some("new"));
}

#[tokio::test]
async fn test_delete_and_clear() {
    let cache: CacheService<u32> = CacheService::new();
    cache.set("a", 1).await;
    cache.set("b", 2).await;
    cache.set("c", 3).await;

    cache.delete("a").await;
    assert_eq!(cache.get("a").await, None);
    assert_eq!(cache.stats().await.size, 2);

    cache.clear().await;
    assert_eq!(cache.stats().await.size, 0);
    assert_eq!(cache.get("b").await, None);
}

#[tokio::test]
async fn test_stats_lists_keys() {
    let cache: CacheService<u32> = CacheService::new();
    cache.set("first", 1).await;
    cache.set("second", 2).await;

    let stats = cache.stats().await;
    assert_eq!(stats.size, 2);

    let mut keys = stats.keys;
    keys.sort();
    assert_eq!(keys, vec!["first".to_string(), "second".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_sweep_removes_only_expired_entries() {
    let cache: CacheService<u32> = CacheService::new();
    cache.set_with_ttl("short", 1, 1).await;
    cache.set_with_ttl("long", 2, 3600).await;

    tokio::time::advance(Duration::from_secs(2)).await;

    assert_eq!(cache.sweep().await, 1);
    let stats = cache.stats().await;
    assert_eq!(stats.keys, vec!["long".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_background_sweeper_evicts_expired_entries() {
    let cache: CacheService<u32> = CacheService::new();
    cache.set_with_ttl("short", 1, 1).await;
    cache.start_cleanup(Duration::from_secs(60));

    tokio::time::sleep(Duration::from_secs(61)).await;

    assert_eq!(cache.stats().await.size, 0);
    cache.stop_cleanup();
}

#[tokio::test(start_paused = true)]
async fn test_stopped_sweeper_leaves_entries_in_place() {
    let cache: CacheService<u32> = CacheService::new();
    cache.set_with_ttl("short", 1, 1).await;
    cache.start_cleanup(Duration::from_secs(60));
    cache.stop_cleanup();

    tokio::time::sleep(Duration::from_secs(61)).await;

    // Still stored until read or swept
    assert_eq!(cache.stats().await.size, 1);
    assert_eq!(cache.get("short").await, None);
}

#[test]
fn test_cache_key_ignores_surrounding_whitespace() {
    assert_eq!(
        cache_key(DiagramType::Pie, "월별 매출 비중"),
        cache_key(DiagramType::Pie, "  월별 매출 비중\n")
    );
}

#[test]
fn test_cache_key_depends_on_type_and_prompt() {
    let pie = cache_key(DiagramType::Pie, "sales");
    assert_ne!(pie, cache_key(DiagramType::Graph, "sales"));
    assert_ne!(pie, cache_key(DiagramType::Pie, "sales by month"));
    assert_eq!(pie, cache_key(DiagramType::Pie, "sales"));
}

#[test]
fn test_cache_key_is_hex_sha256() {
    let key = cache_key(DiagramType::EntityRelationship, "orders");
    assert_eq!(key.len(), 64);
    assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
}
