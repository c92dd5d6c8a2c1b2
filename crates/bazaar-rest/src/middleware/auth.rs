//! Authentication and access token rotation.

use crate::{extractors::CurrentUser, responses::AppError, AppState};
use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use bazaar_service::IssuedToken;
use tracing::{debug, info};

/// Cookie that carries the access token for browser clients.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Resolves the request's access token and rotates it once its record has
/// expired.
///
/// The token is read from `Authorization: Bearer` first, then from the
/// [`ACCESS_TOKEN_COOKIE`] cookie. A missing or rejected token does not fail
/// the request: it continues without a [`CurrentUser`] and handlers decide
/// whether authentication is required. Backend failures while resolving or
/// rotating the token fail the request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_token(request.headers(), &jar) else {
        return next.run(request).await;
    };

    let authentication = match state.auth_service.authenticate(&token).await {
        Ok(authentication) => authentication,
        Err(e) if e.is_authentication_failure() => {
            debug!("Token rejected: {}", e);
            return next.run(request).await;
        }
        Err(e) => return AppError(e).into_response(),
    };

    let rotated = authentication.rotated_token().cloned();
    let identity = authentication.identity().clone();
    debug!(user_id = %identity.id, "Authenticated request");

    request.extensions_mut().insert(CurrentUser {
        identity,
        token_id: authentication.token_id(),
    });

    let response = next.run(request).await;

    match rotated {
        Some(token) => {
            info!(token_id = %authentication.token_id(), "Sending rotated access token");
            let jar = CookieJar::new().add(access_token_cookie(&token, state.secure_cookies));
            (jar, response).into_response()
        }
        None => response,
    }
}

fn extract_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    bearer
        .map(ToString::to_string)
        .or_else(|| jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string()))
        .filter(|t| !t.is_empty())
}

/// Builds the `access_token` cookie for a freshly issued token.
#[must_use]
pub fn access_token_cookie(token: &IssuedToken, secure: bool) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, token.access_token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// A cookie that clears [`ACCESS_TOKEN_COOKIE`] when removed from a jar.
#[must_use]
pub fn access_token_removal() -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        let jar = CookieJar::new().add(Cookie::new(ACCESS_TOKEN_COOKIE, "from-cookie"));

        assert_eq!(extract_token(&headers, &jar).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_cookie_fallback() {
        let jar = CookieJar::new().add(Cookie::new(ACCESS_TOKEN_COOKIE, "from-cookie"));
        assert_eq!(extract_token(&HeaderMap::new(), &jar).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_token(&headers, &CookieJar::new()), None);
    }
}
