//! Cache manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use presence_core::config::cache::CacheConfig;
use presence_core::error::AppError;
use presence_core::result::AppResult;
use presence_core::traits::cache::CacheProvider;

/// Cache manager that wraps the configured cache provider.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// The inner cache provider.
    inner: Arc<dyn CacheProvider>,
    /// Redis client, kept when the Redis provider is active so pub/sub
    /// bridges can share the connection.
    #[cfg(feature = "redis-backend")]
    redis: Option<crate::redis::RedisClient>,
}

impl CacheManager {
    /// Create a new cache manager from configuration.
    pub async fn new(config: &CacheConfig) -> AppResult<Self> {
        match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis cache provider");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                let provider = crate::redis::RedisCacheProvider::new(client.clone());
                Ok(Self {
                    inner: Arc::new(provider),
                    redis: Some(client),
                })
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory cache provider");
                warn!(
                    "In-memory cache is node-local: change markers and the token blocklist \
                     are not shared, so multi-instance deployments must use provider = \"redis\""
                );
                let provider = crate::memory::MemoryCacheProvider::new(
                    &config.memory,
                    config.default_ttl_seconds,
                );
                Ok(Self::from_provider(Arc::new(provider)))
            }
            other => Err(AppError::configuration(format!(
                "Unknown cache provider: '{other}'. Supported: memory, redis"
            ))),
        }
    }

    /// Create a cache manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn CacheProvider>) -> Self {
        Self {
            inner: provider,
            #[cfg(feature = "redis-backend")]
            redis: None,
        }
    }

    /// The Redis client, when the Redis provider is active.
    #[cfg(feature = "redis-backend")]
    pub fn redis_client(&self) -> Option<&crate::redis::RedisClient> {
        self.redis.as_ref()
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }

    async fn incr(&self, key: &str) -> AppResult<i64> {
        self.inner.incr(key).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use presence_core::config::cache::CacheConfig;

    #[tokio::test]
    async fn test_memory_provider_selected_by_default() {
        let manager = CacheManager::new(&CacheConfig::default()).await.unwrap();
        assert!(manager.health_check().await.unwrap());
        assert_eq!(manager.incr("presence:marker:x").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_provider_rejected() {
        let config = CacheConfig {
            provider: "memcached".to_string(),
            ..CacheConfig::default()
        };
        let err = CacheManager::new(&config).await.unwrap_err();
        assert_eq!(err.kind, presence_core::error::ErrorKind::Configuration);
    }
}
