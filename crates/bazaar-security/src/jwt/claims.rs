//! JWT claims structure.

use bazaar_core::{AccessToken, TokenId, UserId, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by an access token.
///
/// `jti` is the id of the server-side [`AccessToken`] record the JWT was
/// minted for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    pub jti: String,
}

impl Claims {
    /// Builds claims mirroring a stored token record.
    #[must_use]
    pub fn for_record(
        record: &AccessToken,
        username: &str,
        role: UserRole,
        issuer: &str,
        audience: &str,
    ) -> Self {
        Self {
            sub: record.user_id.to_string(),
            user_id: record.user_id.into_inner(),
            username: username.to_string(),
            role,
            iat: record.created_at.timestamp(),
            exp: record.expires_at.timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: record.id.to_string(),
        }
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId(self.user_id)
    }

    /// The record id, if `jti` is a well-formed UUID.
    #[must_use]
    pub fn token_id(&self) -> Option<TokenId> {
        TokenId::parse(&self.jti).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_claims_mirror_record() {
        let now = Utc::now();
        let record = AccessToken::issue(UserId::new(), "login", Duration::minutes(30), now);
        let claims = Claims::for_record(&record, "jane", UserRole::Seller, "iss", "aud");

        assert_eq!(claims.user_id(), record.user_id);
        assert_eq!(claims.token_id(), Some(record.id));
        assert_eq!(claims.exp, record.expires_at.timestamp());
        assert_eq!(claims.sub, record.user_id.to_string());
    }

    #[test]
    fn test_malformed_jti() {
        let now = Utc::now();
        let record = AccessToken::issue(UserId::new(), "login", Duration::minutes(30), now);
        let mut claims = Claims::for_record(&record, "jane", UserRole::Customer, "iss", "aud");
        claims.jti = "not-a-uuid".to_string();
        assert!(claims.token_id().is_none());
    }
}
