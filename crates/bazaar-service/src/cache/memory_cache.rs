//! In-process cache used when Redis is disabled, and in tests.

use super::CacheInterface;
use async_trait::async_trait;
use bazaar_core::BazaarResult;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// A map-backed [`CacheInterface`] with per-entry expiry.
///
/// Expiry follows the tokio clock, so paused-time tests can step past a TTL
/// without sleeping. Expired entries are dropped lazily on access.
#[derive(Debug, Default)]
pub struct MemoryCacheService {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCacheService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries, locks included.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().values().filter(|e| e.is_live(now)).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live_value(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.entries.write().remove(key);
        None
    }
}

#[async_trait]
impl CacheInterface for MemoryCacheService {
    async fn get_raw(&self, key: &str) -> BazaarResult<Option<String>> {
        let value = self.live_value(key);
        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }
        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> BazaarResult<()> {
        self.entries.write().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> BazaarResult<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .write()
            .remove(key)
            .is_some_and(|entry| entry.is_live(now)))
    }

    async fn exists(&self, key: &str) -> BazaarResult<bool> {
        Ok(self.live_value(key).is_some())
    }

    async fn try_lock(&self, key: &str, ttl: Duration) -> BazaarResult<Option<String>> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|entry| entry.is_live(now)) {
            return Ok(None);
        }

        let token = Uuid::new_v4().to_string();
        entries.insert(
            key.to_string(),
            Entry {
                value: token.clone(),
                expires_at: now + ttl,
            },
        );
        Ok(Some(token))
    }

    async fn unlock(&self, key: &str, token: &str) -> BazaarResult<bool> {
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|entry| entry.value == token) {
            entries.remove(key);
            return Ok(true);
        }
        Ok(false)
    }
}
