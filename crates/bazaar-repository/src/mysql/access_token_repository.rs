//! MySQL access token repository.

use crate::{traits::AccessTokenRepository, DatabasePool};
use async_trait::async_trait;
use bazaar_core::{AccessToken, BazaarError, BazaarResult, TokenId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;

/// MySQL-backed [`AccessTokenRepository`].
#[derive(Clone)]
pub struct MySqlAccessTokenRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlAccessTokenRepository {
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AccessTokenRow {
    id: String,
    user_id: String,
    name: String,
    expires_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccessTokenRow> for AccessToken {
    type Error = BazaarError;

    fn try_from(row: AccessTokenRow) -> Result<Self, Self::Error> {
        let id = TokenId::parse(&row.id)
            .map_err(|e| BazaarError::Internal(format!("Invalid token id in database: {e}")))?;
        let user_id = UserId::parse(&row.user_id)
            .map_err(|e| BazaarError::Internal(format!("Invalid user id in database: {e}")))?;

        Ok(Self {
            id,
            user_id,
            name: row.name,
            expires_at: row.expires_at,
            last_used_at: row.last_used_at,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl AccessTokenRepository for MySqlAccessTokenRepository {
    async fn find_by_id(&self, id: TokenId) -> BazaarResult<Option<AccessToken>> {
        let row = sqlx::query_as::<_, AccessTokenRow>(
            r#"
            SELECT id, user_id, name, expires_at, last_used_at, created_at
            FROM access_tokens
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(AccessToken::try_from).transpose()
    }

    async fn save(&self, token: &AccessToken) -> BazaarResult<()> {
        debug!(user_id = %token.user_id, token_id = %token.id, "Saving access token");

        sqlx::query(
            r#"
            INSERT INTO access_tokens (id, user_id, name, expires_at, last_used_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(token.id.to_string())
        .bind(token.user_id.to_string())
        .bind(&token.name)
        .bind(token.expires_at)
        .bind(token.last_used_at)
        .bind(token.created_at)
        .execute(self.pool.inner())
        .await?;

        Ok(())
    }

    async fn delete(&self, id: TokenId) -> BazaarResult<bool> {
        debug!(token_id = %id, "Deleting access token");

        let result = sqlx::query("DELETE FROM access_tokens WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_user(&self, user_id: UserId) -> BazaarResult<u64> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected())
    }

    async fn touch(&self, id: TokenId, at: DateTime<Utc>) -> BazaarResult<()> {
        sqlx::query("UPDATE access_tokens SET last_used_at = ? WHERE id = ?")
            .bind(at)
            .bind(id.to_string())
            .execute(self.pool.inner())
            .await?;

        Ok(())
    }
}

impl std::fmt::Debug for MySqlAccessTokenRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlAccessTokenRepository").finish_non_exhaustive()
    }
}
