//! Authentication service: accounts, token records, and rotation.

use crate::dto::{AuthResponse, IssuedToken, LoginRequest, RegisterRequest, UserIdentity};
use crate::user_cache::UserCache;
use async_trait::async_trait;
use bazaar_core::{
    AccessToken, BazaarError, BazaarResult, Email, Interface, TokenId, User, UserId, UserRole,
    ValidateExt,
};
use bazaar_repository::{AccessTokenRepository, UserRepository};
use bazaar_security::{PasswordHasher, TokenProvider};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of authenticating a bearer token.
#[derive(Debug, Clone)]
pub enum Authentication {
    /// The token is current.
    Valid {
        identity: UserIdentity,
        token_id: TokenId,
    },
    /// The token had expired and was replaced. The caller must hand
    /// `token` back to the client.
    Rotated {
        identity: UserIdentity,
        token_id: TokenId,
        token: IssuedToken,
    },
}

impl Authentication {
    #[must_use]
    pub const fn identity(&self) -> &UserIdentity {
        match self {
            Self::Valid { identity, .. } | Self::Rotated { identity, .. } => identity,
        }
    }

    /// Id of the record the request now runs under.
    #[must_use]
    pub const fn token_id(&self) -> TokenId {
        match self {
            Self::Valid { token_id, .. } | Self::Rotated { token_id, .. } => *token_id,
        }
    }

    #[must_use]
    pub const fn rotated_token(&self) -> Option<&IssuedToken> {
        match self {
            Self::Rotated { token, .. } => Some(token),
            Self::Valid { .. } => None,
        }
    }
}

/// Authentication service trait.
#[async_trait]
pub trait AuthService: Interface + Send + Sync {
    /// Registers a new customer account and signs them in.
    async fn register(&self, request: RegisterRequest) -> BazaarResult<AuthResponse>;

    /// Logs in with a username or email and a password.
    async fn login(&self, request: LoginRequest) -> BazaarResult<AuthResponse>;

    /// Resolves a bearer token to the user it was issued for.
    ///
    /// A token is only accepted while its server-side record exists. If the
    /// record has expired, it is deleted and a replacement for the same user
    /// is issued.
    async fn authenticate(&self, token: &str) -> BazaarResult<Authentication>;

    /// Revokes one token record. Revoking a missing record is not an error.
    async fn logout(&self, token_id: TokenId) -> BazaarResult<()>;

    /// Revokes every token record of a user, returning how many existed.
    async fn logout_all(&self, user_id: UserId) -> BazaarResult<u64>;

    /// Identity of the signed-in user.
    async fn me(&self, user_id: UserId) -> BazaarResult<UserIdentity>;
}

/// Authentication service implementation.
pub struct AuthServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    token_repository: Arc<dyn AccessTokenRepository>,
    user_cache: Arc<UserCache>,
    password_hasher: Arc<PasswordHasher>,
    token_provider: Arc<TokenProvider>,
}

impl AuthServiceImpl {
    /// Creates a new authentication service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        token_repository: Arc<dyn AccessTokenRepository>,
        user_cache: Arc<UserCache>,
        password_hasher: Arc<PasswordHasher>,
        token_provider: Arc<TokenProvider>,
    ) -> Self {
        Self {
            user_repository,
            token_repository,
            user_cache,
            password_hasher,
            token_provider,
        }
    }

    /// Stores a fresh token record for the user and signs it.
    async fn issue_token(
        &self,
        user_id: UserId,
        username: &str,
        role: UserRole,
        name: &str,
    ) -> BazaarResult<(TokenId, IssuedToken)> {
        let now = Utc::now();
        let record = AccessToken::issue(user_id, name, self.token_provider.expiration_window(), now);
        self.token_repository.save(&record).await?;

        let jwt = self.token_provider.sign(&record, username, role)?;
        Ok((record.id, IssuedToken::bearer(jwt, record.expires_at, now)))
    }

    async fn respond(&self, user: &User, name: &str) -> BazaarResult<AuthResponse> {
        let (_, token) = self.issue_token(user.id, &user.username, user.role, name).await?;
        Ok(AuthResponse {
            token,
            user: UserIdentity::from(user),
        })
    }

    /// Replaces an expired record with a new one for the same user.
    async fn rotate(
        &self,
        record: &AccessToken,
        identity: &UserIdentity,
    ) -> BazaarResult<(TokenId, IssuedToken)> {
        // A concurrent request may have rotated this record already.
        if !self.token_repository.delete(record.id).await? {
            debug!(token_id = %record.id, "Expired token record already removed");
        }

        let issued = self
            .issue_token(identity.id, &identity.username, identity.role, &record.name)
            .await?;

        info!(user_id = %identity.id, old_token = %record.id, new_token = %issued.0, "Access token rotated");
        Ok(issued)
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn register(&self, request: RegisterRequest) -> BazaarResult<AuthResponse> {
        debug!("Registering user: {}", request.username);

        request.validate_request()?;

        if self.user_repository.exists_by_username(&request.username).await? {
            return Err(BazaarError::Conflict(format!(
                "Username '{}' already exists",
                request.username
            )));
        }

        if self.user_repository.exists_by_email(&request.email).await? {
            return Err(BazaarError::Conflict(format!(
                "Email '{}' already exists",
                request.email
            )));
        }

        let email = Email::new(&request.email).map_err(|e| BazaarError::Validation(e.to_string()))?;
        let password_hash = self.password_hasher.hash(&request.password)?;

        let mut user = User::new(request.username, email, password_hash);
        user.display_name = request.display_name;
        let saved = self.user_repository.save(&user).await?;

        info!("User registered: {}", saved.id);
        self.respond(&saved, "register").await
    }

    async fn login(&self, request: LoginRequest) -> BazaarResult<AuthResponse> {
        debug!("Login attempt: {}", request.username_or_email);

        request.validate_request()?;

        let user = self
            .user_repository
            .find_by_username_or_email(&request.username_or_email)
            .await?
            .ok_or(BazaarError::InvalidCredentials)?;

        if !self.password_hasher.verify(&request.password, &user.password_hash)? {
            warn!("Failed login for user: {}", user.id);
            return Err(BazaarError::InvalidCredentials);
        }

        if !user.can_login() {
            return Err(BazaarError::forbidden(format!("Account is {}", user.status)));
        }

        info!("User logged in: {}", user.id);
        self.respond(&user, "login").await
    }

    async fn authenticate(&self, token: &str) -> BazaarResult<Authentication> {
        let claims = self.token_provider.verify(token)?;
        let token_id = claims
            .token_id()
            .ok_or_else(|| BazaarError::InvalidToken("Malformed token id".to_string()))?;

        let record = self
            .token_repository
            .find_by_id(token_id)
            .await?
            .ok_or_else(|| BazaarError::InvalidToken("Token has been revoked".to_string()))?;

        if record.user_id != claims.user_id() {
            return Err(BazaarError::InvalidToken("Token subject mismatch".to_string()));
        }

        let identity = self
            .user_cache
            .get_or_load(record.user_id)
            .await?
            .ok_or_else(|| BazaarError::InvalidToken("User no longer exists".to_string()))?;

        if !identity.status.can_login() {
            return Err(BazaarError::unauthorized(format!("Account is {}", identity.status)));
        }

        let now = Utc::now();
        if record.is_expired_at(now) {
            let (token_id, token) = self.rotate(&record, &identity).await?;
            return Ok(Authentication::Rotated {
                identity,
                token_id,
                token,
            });
        }

        if let Err(e) = self.token_repository.touch(token_id, now).await {
            warn!(token_id = %token_id, error = %e, "Failed to record token use");
        }

        Ok(Authentication::Valid { identity, token_id })
    }

    async fn logout(&self, token_id: TokenId) -> BazaarResult<()> {
        debug!("Logging out token: {}", token_id);

        if self.token_repository.delete(token_id).await? {
            info!("Token revoked: {}", token_id);
        }
        Ok(())
    }

    async fn logout_all(&self, user_id: UserId) -> BazaarResult<u64> {
        let revoked = self.token_repository.delete_by_user(user_id).await?;
        info!("Revoked {} tokens for user {}", revoked, user_id);
        Ok(revoked)
    }

    async fn me(&self, user_id: UserId) -> BazaarResult<UserIdentity> {
        self.user_cache
            .get_or_load(user_id)
            .await?
            .ok_or_else(|| BazaarError::not_found("User", user_id))
    }
}

impl std::fmt::Debug for AuthServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthServiceImpl").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheService;
    use crate::test_support::InMemoryAccounts;
    use crate::user_cache::USER_AUTH_TTL;
    use bazaar_config::SecurityConfig;
    use bazaar_core::UserStatus;

    struct Fixture {
        accounts: Arc<InMemoryAccounts>,
        service: AuthServiceImpl,
        provider: Arc<TokenProvider>,
        user_cache: Arc<UserCache>,
    }

    fn fixture() -> Fixture {
        let accounts = Arc::new(InMemoryAccounts::new());
        let user_cache = Arc::new(UserCache::new(
            Arc::new(MemoryCacheService::new()),
            accounts.clone(),
            USER_AUTH_TTL,
        ));
        let provider = Arc::new(TokenProvider::new(Arc::new(SecurityConfig::default())));
        let service = AuthServiceImpl::new(
            accounts.clone(),
            accounts.clone(),
            user_cache.clone(),
            Arc::new(PasswordHasher::with_cost(1)),
            provider.clone(),
        );
        Fixture {
            accounts,
            service,
            provider,
            user_cache,
        }
    }

    fn register_request(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "correct horse battery".to_string(),
            display_name: None,
        }
    }

    fn token_id_of(provider: &TokenProvider, jwt: &str) -> TokenId {
        provider.verify(jwt).unwrap().token_id().unwrap()
    }

    /// Pushes a stored record's expiry into the past.
    fn expire(accounts: &InMemoryAccounts, id: TokenId) {
        let mut record = accounts.token(id).unwrap();
        record.expires_at = Utc::now() - chrono::Duration::seconds(1);
        accounts.insert_token(record);
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let f = fixture();
        let registered = f.service.register(register_request("carol")).await.unwrap();
        assert_eq!(registered.user.username, "carol");
        assert_eq!(registered.token.token_type, "Bearer");

        let by_email = f
            .service
            .login(LoginRequest {
                username_or_email: "CAROL@example.com".to_string(),
                password: "correct horse battery".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(by_email.user.id, registered.user.id);
        assert_eq!(f.accounts.token_count(), 2);
    }

    #[tokio::test]
    async fn test_register_duplicate_username_conflicts() {
        let f = fixture();
        f.service.register(register_request("dave")).await.unwrap();

        let mut again = register_request("dave");
        again.email = "other@example.com".to_string();
        let err = f.service.register(again).await.unwrap_err();
        assert!(matches!(err, BazaarError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let f = fixture();
        f.service.register(register_request("erin")).await.unwrap();

        let err = f
            .service
            .login(LoginRequest {
                username_or_email: "erin".to_string(),
                password: "wrong password".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BazaarError::InvalidCredentials));

        let err = f
            .service
            .login(LoginRequest {
                username_or_email: "nobody".to_string(),
                password: "whatever".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BazaarError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_current_token_authenticates() {
        let f = fixture();
        let auth = f.service.register(register_request("frank")).await.unwrap();

        let outcome = f.service.authenticate(&auth.token.access_token).await.unwrap();
        assert!(outcome.rotated_token().is_none());
        assert_eq!(outcome.identity().username, "frank");

        let id = token_id_of(&f.provider, &auth.token.access_token);
        assert!(f.accounts.token(id).unwrap().last_used_at.is_some());
    }

    #[tokio::test]
    async fn test_expired_token_is_rotated() {
        let f = fixture();
        let auth = f.service.register(register_request("grace")).await.unwrap();
        let old_id = token_id_of(&f.provider, &auth.token.access_token);
        expire(&f.accounts, old_id);
        let old_expiry = f.accounts.token(old_id).unwrap().expires_at;

        let outcome = f.service.authenticate(&auth.token.access_token).await.unwrap();
        let Authentication::Rotated {
            identity,
            token_id: new_id,
            token,
        } = outcome
        else {
            panic!("expected rotation");
        };

        assert_eq!(identity.username, "grace");
        assert!(token.expires_at > old_expiry);
        assert!(f.accounts.token(old_id).is_none());

        assert_eq!(token_id_of(&f.provider, &token.access_token), new_id);
        assert_ne!(new_id, old_id);
        assert_eq!(f.accounts.token(new_id).unwrap().name, "register");

        let err = f.service.authenticate(&auth.token.access_token).await.unwrap_err();
        assert!(matches!(err, BazaarError::InvalidToken(_)));
        assert!(f.service.authenticate(&token.access_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_double_rotation_is_harmless() {
        let f = fixture();
        let auth = f.service.register(register_request("heidi")).await.unwrap();
        let old_id = token_id_of(&f.provider, &auth.token.access_token);
        expire(&f.accounts, old_id);
        let record = f.accounts.token(old_id).unwrap();
        let identity = f.service.me(record.user_id).await.unwrap();

        // Two requests carrying the same expired token race to rotate it.
        let (first, _) = f.service.rotate(&record, &identity).await.unwrap();
        let (second, _) = f.service.rotate(&record, &identity).await.unwrap();

        assert_ne!(first, second);
        assert!(f.accounts.token(old_id).is_none());
    }

    #[tokio::test]
    async fn test_logout_revokes_token_and_is_idempotent() {
        let f = fixture();
        let auth = f.service.register(register_request("ivan")).await.unwrap();
        let id = token_id_of(&f.provider, &auth.token.access_token);

        f.service.logout(id).await.unwrap();
        f.service.logout(id).await.unwrap();

        let err = f.service.authenticate(&auth.token.access_token).await.unwrap_err();
        assert!(matches!(err, BazaarError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_suspended_user_cannot_authenticate() {
        let f = fixture();
        let auth = f.service.register(register_request("judy")).await.unwrap();

        let mut user = UserRepository::find_by_id(f.accounts.as_ref(), auth.user.id)
            .await
            .unwrap()
            .unwrap();
        user.change_status(UserStatus::Suspended);
        UserRepository::update(f.accounts.as_ref(), &user).await.unwrap();
        f.user_cache.evict(user.id).await;

        let err = f.service.authenticate(&auth.token.access_token).await.unwrap_err();
        assert!(matches!(err, BazaarError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_garbage_token_is_invalid() {
        let f = fixture();
        let err = f.service.authenticate("not.a.jwt").await.unwrap_err();
        assert!(matches!(err, BazaarError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_logout_all() {
        let f = fixture();
        let auth = f.service.register(register_request("ken")).await.unwrap();
        f.service
            .login(LoginRequest {
                username_or_email: "ken".to_string(),
                password: "correct horse battery".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(f.service.logout_all(auth.user.id).await.unwrap(), 2);
        assert_eq!(f.accounts.token_count(), 0);
    }
}
