//! Server-side access token records.

use crate::{TokenId, UserId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A persisted access token.
///
/// The record, not the JWT `exp` claim, decides whether a token is still
/// current: a token is only accepted while its record exists, and it is
/// rotated once `expires_at` has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub id: TokenId,
    pub user_id: UserId,
    /// Client label, e.g. `login` or `refresh`.
    pub name: String,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AccessToken {
    /// Creates a record valid for `window` starting at `now`.
    #[must_use]
    pub fn issue(user_id: UserId, name: impl Into<String>, window: Duration, now: DateTime<Utc>) -> Self {
        Self {
            id: TokenId::new(),
            user_id,
            name: name.into(),
            expires_at: now + window,
            last_used_at: None,
            created_at: now,
        }
    }

    /// Expired means `expires_at` is at or before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let now = Utc::now();
        let token = AccessToken::issue(UserId::new(), "login", Duration::minutes(15), now);
        assert!(!token.is_expired_at(now));
        assert!(!token.is_expired_at(now + Duration::minutes(14)));
        assert!(token.is_expired_at(now + Duration::minutes(15)));
        assert!(token.is_expired_at(now + Duration::minutes(16)));
    }

    #[test]
    fn test_issue_sets_fresh_id() {
        let now = Utc::now();
        let user = UserId::new();
        let a = AccessToken::issue(user, "login", Duration::minutes(1), now);
        let b = AccessToken::issue(user, "login", Duration::minutes(1), now);
        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, now);
    }
}
