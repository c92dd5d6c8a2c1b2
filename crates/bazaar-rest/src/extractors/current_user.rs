//! Authenticated user extractors.

use crate::responses::ApiResponse;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bazaar_core::{BazaarError, ErrorResponse, TokenId};
use bazaar_security::Actor;
use bazaar_service::UserIdentity;

/// The identity resolved by the auth middleware, stored in request
/// extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub identity: UserIdentity,
    /// Record the request authenticated with, after any rotation.
    pub token_id: TokenId,
}

impl CurrentUser {
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor::new(self.identity.id, self.identity.role)
    }
}

/// Extractor that requires an authenticated user.
pub struct AuthenticatedUser(pub CurrentUser);

impl std::ops::Deref for AuthenticatedUser {
    type Target = CurrentUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Rejection for [`AuthenticatedUser`].
pub struct AuthError(BazaarError);

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::UNAUTHORIZED);
        let body = Json(ApiResponse::error(ErrorResponse::from_error(&self.0)));
        (status, body).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or_else(|| AuthError(BazaarError::unauthorized("Authentication required")))
    }
}
