//! Redis-based cache implementation.

use super::CacheInterface;
use async_trait::async_trait;
use bazaar_core::{BazaarError, BazaarResult, HealthCheck, HealthStatus};
use deadpool_redis::{Config, Pool, PoolConfig, Runtime};
use redis::{AsyncCommands, Script};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Deletes the lock only while it still carries the caller's token.
const UNLOCK_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

/// Redis-based cache service.
///
/// Every key is namespaced with the configured prefix so several
/// applications can share one Redis database.
pub struct RedisCacheService {
    pool: Arc<Pool>,
    prefix: String,
}

impl RedisCacheService {
    /// Create a new Redis cache service.
    #[must_use]
    pub fn new(pool: Arc<Pool>, prefix: impl Into<String>) -> Self {
        Self {
            pool,
            prefix: prefix.into(),
        }
    }

    /// Builds a connection pool for `url`.
    pub fn create_pool(url: &str, max_size: usize) -> BazaarResult<Pool> {
        let mut config = Config::from_url(url);
        config.pool = Some(PoolConfig::new(max_size));
        config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| BazaarError::Configuration(format!("Invalid Redis configuration: {e}")))
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> BazaarResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| BazaarError::Cache(format!("Failed to get Redis connection: {e}")))
    }
}

#[async_trait]
impl CacheInterface for RedisCacheService {
    async fn get_raw(&self, key: &str) -> BazaarResult<Option<String>> {
        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn
            .get(self.key(key))
            .await
            .map_err(|e| BazaarError::Cache(format!("Failed to get key '{key}': {e}")))?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> BazaarResult<()> {
        let mut conn = self.get_conn().await?;
        let ttl_secs = ttl.as_secs().max(1);

        conn.set_ex::<_, _, ()>(self.key(key), value, ttl_secs)
            .await
            .map_err(|e| BazaarError::Cache(format!("Failed to set key '{key}': {e}")))?;

        debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
        Ok(())
    }

    async fn delete(&self, key: &str) -> BazaarResult<bool> {
        let mut conn = self.get_conn().await?;
        let deleted: i64 = conn
            .del(self.key(key))
            .await
            .map_err(|e| BazaarError::Cache(format!("Failed to delete key '{key}': {e}")))?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> BazaarResult<bool> {
        let mut conn = self.get_conn().await?;
        let exists: bool = conn
            .exists(self.key(key))
            .await
            .map_err(|e| BazaarError::Cache(format!("Failed to check key '{key}': {e}")))?;

        Ok(exists)
    }

    async fn try_lock(&self, key: &str, ttl: Duration) -> BazaarResult<Option<String>> {
        let mut conn = self.get_conn().await?;
        let token = Uuid::new_v4().to_string();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);

        // SET NX PX replies OK on success and nil when the key exists.
        let reply: Option<String> = redis::cmd("SET")
            .arg(self.key(key))
            .arg(&token)
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await
            .map_err(|e| BazaarError::Cache(format!("Failed to lock '{key}': {e}")))?;

        Ok(reply.map(|_| token))
    }

    async fn unlock(&self, key: &str, token: &str) -> BazaarResult<bool> {
        let mut conn = self.get_conn().await?;
        let released: i64 = Script::new(UNLOCK_SCRIPT)
            .key(self.key(key))
            .arg(token)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| BazaarError::Cache(format!("Failed to unlock '{key}': {e}")))?;

        Ok(released > 0)
    }
}

#[async_trait]
impl HealthCheck for RedisCacheService {
    fn name(&self) -> &str {
        "redis"
    }

    // Reads fall back to the database without Redis, so an outage only
    // degrades the service.
    async fn check(&self) -> HealthStatus {
        let mut conn = match self.get_conn().await {
            Ok(conn) => conn,
            Err(e) => return HealthStatus::Degraded(e.to_string()),
        };
        let pong: Result<String, redis::RedisError> = redis::cmd("PING").query_async(&mut conn).await;
        match pong {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Degraded(e.to_string()),
        }
    }
}

impl std::fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
