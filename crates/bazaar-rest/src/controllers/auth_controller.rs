//! Authentication controller.

use crate::{
    extractors::{AuthenticatedUser, ValidatedJson},
    middleware::{access_token_cookie, access_token_removal},
    responses::{ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use bazaar_service::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest, UserIdentity};
use tracing::{debug, info};

/// Creates the authentication router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/logout-all", post(logout_all))
        .route("/me", get(me))
}

/// Registers an account and signs it in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 409, description = "Username or email already taken"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<ApiResponse<AuthResponse>>), AppError> {
    debug!("Register request: {}", request.username);

    let response = state.auth_service.register(request).await?;
    let jar = jar.add(access_token_cookie(&response.token, state.secure_cookies));

    Ok((StatusCode::CREATED, jar, Json(ApiResponse::success(response))))
}

/// Signs in with a username or email and password.
///
/// The token is returned in the body and as the `access_token` cookie.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<AuthResponse>>), AppError> {
    debug!("Login request: {}", request.username_or_email);

    let response = state.auth_service.login(request).await?;
    let jar = jar.add(access_token_cookie(&response.token, state.secure_cookies));

    Ok((jar, Json(ApiResponse::success(response))))
}

/// Revokes the token the request authenticated with.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<MessageResponse>>), AppError> {
    state.auth_service.logout(user.token_id).await?;
    info!(user_id = %user.identity.id, "User signed out");

    let jar = jar.remove(access_token_removal());
    Ok((jar, Json(ApiResponse::success(MessageResponse::new("Signed out")))))
}

/// Revokes every token of the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout-all",
    tag = "auth",
    responses(
        (status = 200, description = "All sessions revoked", body = MessageResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout_all(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<MessageResponse>>), AppError> {
    let revoked = state.auth_service.logout_all(user.identity.id).await?;

    let jar = jar.remove(access_token_removal());
    let message = MessageResponse::new(format!("Revoked {revoked} session(s)"));
    Ok((jar, Json(ApiResponse::success(message))))
}

/// The signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserIdentity),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(State(state): State<AppState>, user: AuthenticatedUser) -> ApiResult<UserIdentity> {
    let identity = state.auth_service.me(user.identity.id).await?;
    ok(identity)
}
