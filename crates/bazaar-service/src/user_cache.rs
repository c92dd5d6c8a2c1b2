//! Cache of authenticated user identities.

use crate::cache::{cache_keys, CacheExt, CacheInterface};
use crate::dto::UserIdentity;
use bazaar_core::{BazaarResult, UserId};
use bazaar_repository::UserRepository;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default lifetime of a cached identity (10 minutes).
pub const USER_AUTH_TTL: Duration = Duration::from_secs(600);

/// How long an eviction keeps concurrent loads from re-filling the entry.
///
/// Must outlast the slowest identity load from the store.
pub const EVICTION_MARKER_TTL: Duration = Duration::from_secs(30);

/// Resolves request identities through `user_auth:<id>` entries.
///
/// An entry lives until its TTL runs out or [`UserCache::evict`] removes it.
/// Eviction also leaves a marker for [`EVICTION_MARKER_TTL`]; while it is
/// present no load writes the entry back, so a load that read the store
/// before the write cannot resurrect the old identity. Cache failures fall
/// back to the repository.
pub struct UserCache {
    cache: Arc<dyn CacheInterface>,
    user_repository: Arc<dyn UserRepository>,
    ttl: Duration,
}

impl UserCache {
    #[must_use]
    pub fn new(
        cache: Arc<dyn CacheInterface>,
        user_repository: Arc<dyn UserRepository>,
        ttl: Duration,
    ) -> Self {
        Self {
            cache,
            user_repository,
            ttl,
        }
    }

    /// Cached identity for `id`, loading and caching it on a miss.
    ///
    /// Returns `None` for users that do not exist; misses are not cached.
    pub async fn get_or_load(&self, id: UserId) -> BazaarResult<Option<UserIdentity>> {
        let key = cache_keys::user_auth(id);

        if let Some(identity) = self.cache.peek::<UserIdentity>(&key).await {
            debug!("Cache hit for user identity: {}", id);
            return Ok(Some(identity));
        }

        let Some(user) = self.user_repository.find_by_id(id).await? else {
            return Ok(None);
        };
        let identity = UserIdentity::from(user);

        if self.recently_evicted(id).await {
            debug!(user_id = %id, "Identity recently evicted, not caching");
            return Ok(Some(identity));
        }

        if let Err(e) = self.cache.set(&key, &identity, self.ttl).await {
            warn!(user_id = %id, error = %e, "Failed to cache user identity");
            return Ok(Some(identity));
        }

        // An eviction may have landed between the store read and the write.
        if self.recently_evicted(id).await {
            debug!(user_id = %id, "Eviction raced a load, dropping written identity");
            if let Err(e) = self.cache.delete(&key).await {
                warn!(user_id = %id, error = %e, "Failed to drop raced user identity");
            }
        }

        Ok(Some(identity))
    }

    /// Drops the cached identity so the next lookup reads the store.
    pub async fn evict(&self, id: UserId) {
        // The marker goes first so a load that writes after the delete sees it.
        if let Err(e) = self
            .cache
            .set_raw(&cache_keys::user_auth_evicted(id), "1", EVICTION_MARKER_TTL)
            .await
        {
            warn!(user_id = %id, error = %e, "Failed to mark user identity evicted");
        }

        match self.cache.delete(&cache_keys::user_auth(id)).await {
            Ok(existed) => debug!(user_id = %id, existed, "Evicted user identity"),
            Err(e) => warn!(user_id = %id, error = %e, "Failed to evict user identity"),
        }
    }

    /// Unreadable markers count as present.
    async fn recently_evicted(&self, id: UserId) -> bool {
        match self.cache.exists(&cache_keys::user_auth_evicted(id)).await {
            Ok(marked) => marked,
            Err(e) => {
                warn!(user_id = %id, error = %e, "Could not read eviction marker");
                true
            }
        }
    }
}

impl std::fmt::Debug for UserCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
