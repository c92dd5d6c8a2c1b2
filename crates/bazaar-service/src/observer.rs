//! Hooks run after successful user writes.

use crate::user_cache::UserCache;
use async_trait::async_trait;
use bazaar_core::{User, UserId};
use std::sync::Arc;

/// Notified by the user service after a write has been committed.
///
/// Observers cannot fail the write; they handle their own errors.
#[async_trait]
pub trait UserObserver: Send + Sync {
    async fn user_updated(&self, user: &User);

    async fn user_deleted(&self, id: UserId);
}

/// Evicts the authenticated-user cache entry of a changed user.
pub struct UserCacheObserver {
    user_cache: Arc<UserCache>,
}

impl UserCacheObserver {
    #[must_use]
    pub fn new(user_cache: Arc<UserCache>) -> Self {
        Self { user_cache }
    }
}

#[async_trait]
impl UserObserver for UserCacheObserver {
    async fn user_updated(&self, user: &User) {
        self.user_cache.evict(user.id).await;
    }

    async fn user_deleted(&self, id: UserId) {
        self.user_cache.evict(id).await;
    }
}

impl std::fmt::Debug for UserCacheObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCacheObserver").finish_non_exhaustive()
    }
}
