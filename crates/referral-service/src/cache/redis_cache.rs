//! Redis-based cache store.

use super::{validate_ttl, CacheStore};
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Pool, PoolConfig, Runtime};
use referral_config::RedisConfig;
use referral_core::{ReferralError, ReferralResult};
use shaku::Component;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Redis-based cache store.
///
/// Every key is stored under `key_prefix`, so several deployments can share
/// one Redis instance.
#[derive(Component)]
#[shaku(interface = CacheStore)]
pub struct RedisCacheStore {
    /// Redis connection pool; `None` when caching is disabled.
    pool: Option<Arc<Pool>>,
    /// Namespace prepended to every key.
    key_prefix: String,
}

impl RedisCacheStore {
    /// Create a new Redis cache store.
    #[must_use]
    pub fn new(pool: Arc<Pool>, key_prefix: impl Into<String>) -> Self {
        Self {
            pool: Some(pool),
            key_prefix: key_prefix.into(),
        }
    }

    /// Create a cache store from configuration.
    ///
    /// Building the pool does not open any connection.
    pub fn from_config(config: &RedisConfig) -> ReferralResult<Self> {
        if !config.enabled {
            info!("Redis cache disabled by configuration");
            return Ok(Self::disabled());
        }
        Ok(Self::new(
            Arc::new(create_pool(config)?),
            config.key_prefix.clone(),
        ))
    }

    /// Create a no-op cache store (for when Redis is disabled).
    ///
    /// Reads always miss and writes are dropped.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            pool: None,
            key_prefix: String::new(),
        }
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// Get a connection from the pool.
    async fn get_conn(pool: &Pool) -> ReferralResult<deadpool_redis::Connection> {
        pool.get().await.map_err(|e| {
            ReferralError::CacheUnavailable(format!("Failed to get Redis connection: {e}"))
        })
    }
}

/// Creates a Redis connection pool from configuration.
pub fn create_pool(config: &RedisConfig) -> ReferralResult<Pool> {
    let mut cfg = Config::from_url(&config.url);
    cfg.pool = Some(PoolConfig::new(config.pool_size));
    cfg.create_pool(Some(Runtime::Tokio1))
        .map_err(|e| ReferralError::Configuration(format!("Failed to create Redis pool: {e}")))
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> ReferralResult<()> {
        validate_ttl(ttl)?;
        let Some(pool) = &self.pool else {
            return Ok(());
        };

        let key = self.prefixed(key);
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);

        let mut conn = Self::get_conn(pool).await?;
        conn.pset_ex::<_, _, ()>(&key, value, ttl_ms)
            .await
            .map_err(|e| ReferralError::CacheUnavailable(format!("Failed to set key '{key}': {e}")))?;

        debug!("Cached key '{}' with TTL {}ms", key, ttl_ms);
        Ok(())
    }

    async fn get(&self, key: &str) -> ReferralResult<Option<String>> {
        let Some(pool) = &self.pool else {
            return Ok(None);
        };

        let key = self.prefixed(key);
        let mut conn = Self::get_conn(pool).await?;
        let value: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| ReferralError::CacheUnavailable(format!("Failed to get key '{key}': {e}")))?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn remaining_ttl(&self, key: &str) -> ReferralResult<Option<Duration>> {
        let Some(pool) = &self.pool else {
            return Ok(None);
        };

        let key = self.prefixed(key);
        let mut conn = Self::get_conn(pool).await?;
        // -2: no such key, -1: no expiry
        let pttl: i64 = conn
            .pttl(&key)
            .await
            .map_err(|e| ReferralError::CacheUnavailable(format!("Failed to read TTL of '{key}': {e}")))?;

        Ok(u64::try_from(pttl)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis))
    }

    async fn delete(&self, key: &str) -> ReferralResult<bool> {
        let Some(pool) = &self.pool else {
            return Ok(false);
        };

        let key = self.prefixed(key);
        let mut conn = Self::get_conn(pool).await?;
        let deleted: i64 = conn
            .del(&key)
            .await
            .map_err(|e| ReferralError::CacheUnavailable(format!("Failed to delete key '{key}': {e}")))?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted > 0)
    }
}

impl std::fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheStore")
            .field("enabled", &self.is_enabled())
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}
