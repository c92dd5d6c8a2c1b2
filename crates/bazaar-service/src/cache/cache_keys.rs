//! Cache key generators for consistent key naming.
//!
//! Keys are unprefixed here; backends that share a keyspace with other
//! applications add their own namespace.

use bazaar_core::UserId;

/// Key of the full category tree snapshot.
pub const CATEGORIES_WITH_QUESTIONS: &str = "categories_with_questions";

/// Key of the cached identity for an authenticated user.
#[must_use]
pub fn user_auth(id: UserId) -> String {
    format!("user_auth:{id}")
}

/// Short-lived marker written when a user's cached identity is evicted.
#[must_use]
pub fn user_auth_evicted(id: UserId) -> String {
    format!("user_auth_evicted:{id}")
}

/// Key of the cross-process recompute lock guarding `key`.
#[must_use]
pub fn lock(key: &str) -> String {
    format!("lock:{key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_auth_key() {
        let id = UserId::new();
        assert_eq!(user_auth(id), format!("user_auth:{id}"));
    }

    #[test]
    fn test_eviction_marker_key() {
        let id = UserId::new();
        assert_eq!(user_auth_evicted(id), format!("user_auth_evicted:{id}"));
        assert_ne!(user_auth_evicted(id), user_auth(id));
    }

    #[test]
    fn test_lock_key() {
        assert_eq!(lock(CATEGORIES_WITH_QUESTIONS), "lock:categories_with_questions");
    }
}
