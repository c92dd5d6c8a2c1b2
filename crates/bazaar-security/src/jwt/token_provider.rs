//! Signs and verifies access tokens.

use super::Claims;
use bazaar_config::SecurityConfig;
use bazaar_core::{AccessToken, BazaarError, BazaarResult, UserRole};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use tracing::{debug, warn};

/// HS256 JWT signer and verifier.
///
/// Verification checks signature, issuer, and audience only. Whether a
/// token is still current is decided by its stored record, so an `exp` in
/// the past does not fail decoding; the caller rotates it instead.
#[derive(Clone)]
pub struct TokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: Arc<SecurityConfig>,
    validation: Validation,
}

impl TokenProvider {
    #[must_use]
    pub fn new(config: Arc<SecurityConfig>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.jwt_issuer]);
        validation.set_audience(&[&config.jwt_audience]);
        validation.validate_exp = false;
        validation.validate_nbf = false;

        Self {
            encoding_key,
            decoding_key,
            config,
            validation,
        }
    }

    /// Lifetime of newly issued token records.
    #[must_use]
    pub fn expiration_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.config.token_expiration_minutes)
    }

    /// Signs a JWT for a stored token record.
    pub fn sign(&self, record: &AccessToken, username: &str, role: UserRole) -> BazaarResult<String> {
        let claims = Claims::for_record(
            record,
            username,
            role,
            &self.config.jwt_issuer,
            &self.config.jwt_audience,
        );

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| BazaarError::Internal(format!("Failed to sign access token: {e}")))?;

        debug!(user_id = %record.user_id, token_id = %record.id, "Signed access token");
        Ok(token)
    }

    /// Verifies a JWT and returns its claims.
    pub fn verify(&self, token: &str) -> BazaarResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            warn!("Token verification failed: {}", e);
            let reason = match e.kind() {
                ErrorKind::InvalidSignature => "invalid signature",
                ErrorKind::InvalidIssuer => "invalid issuer",
                ErrorKind::InvalidAudience => "invalid audience",
                _ => "malformed token",
            };
            BazaarError::InvalidToken(reason.to_string())
        })?;

        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("issuer", &self.config.jwt_issuer)
            .field("audience", &self.config.jwt_audience)
            .finish_non_exhaustive()
    }
}
