//! In-memory cache implementation using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use presence_core::config::cache::MemoryCacheConfig;
use presence_core::result::AppResult;
use presence_core::traits::cache::CacheProvider;

/// A cached value together with its own time-to-live.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with, capped by the
/// configured ceiling.
#[derive(Debug, Clone, Copy)]
struct PerEntryExpiry {
    ceiling: Duration,
}

impl Expiry<String, Entry> for PerEntryExpiry {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _at: Instant) -> Option<Duration> {
        Some(entry.ttl.min(self.ceiling))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _at: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl.min(self.ceiling))
    }
}

/// In-memory cache provider using moka.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache.
    cache: Cache<String, Entry>,
    /// TTL applied to counters, refreshed on every increment.
    default_ttl: Duration,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig, default_ttl_seconds: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryExpiry {
                ceiling: Duration::from_secs(config.time_to_live_seconds),
            })
            .build();

        Self {
            cache,
            default_ttl: Duration::from_secs(default_ttl_seconds),
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.get(key).await.is_some())
    }

    async fn incr(&self, key: &str) -> AppResult<i64> {
        let ttl = self.default_ttl;
        // The upsert holds the key's lock, so concurrent increments serialize.
        let updated = self
            .cache
            .entry(key.to_string())
            .and_upsert_with(|current| async move {
                let count = current
                    .and_then(|entry| entry.into_value().value.parse::<i64>().ok())
                    .unwrap_or(0);
                Entry {
                    value: (count + 1).to_string(),
                    ttl,
                }
            })
            .await;

        Ok(updated.into_value().value.parse().unwrap_or_default())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MemoryCacheProvider {
        MemoryCacheProvider::new(&MemoryCacheConfig::default(), 300)
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = provider();
        cache
            .set("presence:jwt:blocked:a", "1", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            cache.get("presence:jwt:blocked:a").await.unwrap().as_deref(),
            Some("1")
        );
        assert!(cache.exists("presence:jwt:blocked:a").await.unwrap());

        cache.delete("presence:jwt:blocked:a").await.unwrap();
        assert!(!cache.exists("presence:jwt:blocked:a").await.unwrap());
    }

    #[tokio::test]
    async fn test_incr_is_monotonic() {
        let cache = provider();
        assert_eq!(cache.incr("presence:marker:u").await.unwrap(), 1);
        assert_eq!(cache.incr("presence:marker:u").await.unwrap(), 2);
        assert_eq!(cache.incr("presence:marker:v").await.unwrap(), 1);
        assert_eq!(
            cache.get("presence:marker:u").await.unwrap().as_deref(),
            Some("2")
        );
    }

    #[tokio::test]
    async fn test_counter_restarts_once_expired() {
        let cache = MemoryCacheProvider::new(&MemoryCacheConfig::default(), 1);
        assert_eq!(cache.incr("presence:marker:u").await.unwrap(), 1);
        assert_eq!(cache.incr("presence:marker:u").await.unwrap(), 2);

        tokio::time::sleep(Duration::from_millis(1200)).await;

        assert_eq!(cache.get("presence:marker:u").await.unwrap(), None);
        assert_eq!(cache.incr("presence:marker:u").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_incr_loses_no_updates() {
        let cache = provider();
        let tasks = (0..32)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.incr("presence:marker:c").await.unwrap() })
            })
            .collect::<Vec<_>>();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(cache.incr("presence:marker:c").await.unwrap(), 33);
    }

    #[tokio::test]
    async fn test_entry_expires_after_its_own_ttl() {
        let cache = provider();
        cache
            .set("short", "x", Duration::from_millis(50))
            .await
            .unwrap();
        cache
            .set("long", "y", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(cache.get("short").await.unwrap(), None);
        assert_eq!(cache.get("long").await.unwrap().as_deref(), Some("y"));
    }
}
