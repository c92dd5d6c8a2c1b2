//! Cache interface trait for abstracted caching operations.

use super::{cache_keys, StampedeGuard};
use bazaar_core::{BazaarResult, Interface};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Cache interface for storing and retrieving cached data.
///
/// Values travel as JSON strings so the trait stays dyn-compatible; typed
/// access lives on [`CacheExt`].
#[async_trait]
pub trait CacheInterface: Interface + Send + Sync {
    /// Get a raw JSON value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    async fn get_raw(&self, key: &str) -> BazaarResult<Option<String>>;

    /// Set a raw JSON value in the cache with a TTL.
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> BazaarResult<()>;

    /// Delete a value from the cache.
    ///
    /// Returns `true` if the key existed and was deleted.
    async fn delete(&self, key: &str) -> BazaarResult<bool>;

    /// Check if a key exists in the cache.
    async fn exists(&self, key: &str) -> BazaarResult<bool>;

    /// Try to take a lock that expires on its own after `ttl`.
    ///
    /// Returns the holder token on success and `None` when someone else
    /// holds the lock.
    async fn try_lock(&self, key: &str, ttl: Duration) -> BazaarResult<Option<String>>;

    /// Release a lock, but only if `token` still owns it.
    async fn unlock(&self, key: &str, token: &str) -> BazaarResult<bool>;
}

/// Extension trait with typed methods for convenience.
#[async_trait]
pub trait CacheExt: CacheInterface {
    /// Get a typed value from the cache.
    async fn get<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> BazaarResult<Option<T>> {
        match self.get_raw(key).await? {
            Some(json) => {
                let value: T = serde_json::from_str(&json)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value in the cache.
    async fn set<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> BazaarResult<()> {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, &json, ttl).await
    }

    /// Like [`CacheExt::get`], but a backend or decoding failure counts as
    /// a miss.
    async fn peek<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        match self.get::<T>(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Get a value or compute, cache, and return it.
    ///
    /// Within a process only one caller recomputes a given key at a time;
    /// the rest wait and then read the fresh entry. Across processes a
    /// short-lived cache lock keeps most other instances from recomputing
    /// too. A caller that finds the lock taken polls the cache until
    /// `guard`'s wait budget runs out and then computes anyway.
    ///
    /// Cache failures never fail the call. Errors from `compute` are
    /// returned unchanged and nothing is cached for them.
    async fn remember<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        guard: &StampedeGuard,
        compute: F,
    ) -> BazaarResult<T>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: std::future::Future<Output = BazaarResult<T>> + Send,
    {
        if let Some(hit) = self.peek::<T>(key).await {
            return Ok(hit);
        }

        let _flight = guard.flights().acquire(key).await;

        // Whoever held the flight before us may have filled the entry.
        if let Some(hit) = self.peek::<T>(key).await {
            debug!(key, "Cache filled while waiting for in-process recompute");
            return Ok(hit);
        }

        let lock_key = cache_keys::lock(key);
        let lock_token = match self.try_lock(&lock_key, guard.lock_ttl()).await {
            Ok(Some(token)) => Some(token),
            Ok(None) => {
                debug!(key, "Recompute lock held elsewhere, polling cache");
                let deadline = tokio::time::Instant::now() + guard.lock_wait();
                while tokio::time::Instant::now() < deadline {
                    tokio::time::sleep(guard.poll_interval()).await;
                    if let Some(hit) = self.peek::<T>(key).await {
                        return Ok(hit);
                    }
                }
                warn!(key, "Gave up waiting for recompute lock, computing directly");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "Could not take recompute lock, computing directly");
                None
            }
        };

        let result = compute().await;

        if let Ok(value) = &result {
            if let Err(e) = self.set(key, value, ttl).await {
                warn!(key, error = %e, "Failed to store computed value");
            }
        }

        if let Some(token) = lock_token {
            if let Err(e) = self.unlock(&lock_key, &token).await {
                warn!(key, error = %e, "Failed to release recompute lock");
            }
        }

        result
    }
}

// Blanket implementation for all CacheInterface implementations
impl<T: CacheInterface + ?Sized> CacheExt for T {}
