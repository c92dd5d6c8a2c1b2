//! User management controller.

use crate::{
    extractors::{AuthenticatedUser, ValidatedJson},
    responses::{no_content, ok, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Router,
};
use bazaar_core::{BazaarError, UserId};
use bazaar_security::{Action, AuthorizationTarget, AuthorizerExt};
use bazaar_service::{ChangeRoleRequest, ChangeStatusRequest, UpdateProfileRequest, UserResponse};
use tracing::debug;

/// Creates the user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/role", patch(change_role))
        .route("/:id/status", patch(change_status))
}

/// Parses the path id and checks the caller may perform `action` on it.
fn authorize_account(
    state: &AppState,
    user: &AuthenticatedUser,
    action: Action,
    id: &str,
) -> Result<UserId, AppError> {
    let user_id = UserId::parse(id)
        .map_err(|_| AppError(BazaarError::validation(format!("Invalid user ID format: {id}"))))?;

    state
        .authorizer
        .authorize(&user.actor(), action, &AuthorizationTarget::User(user_id))?;
    Ok(user_id)
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 403, description = "Not the owner or an admin"),
        (status = 404, description = "Unknown user")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<UserResponse> {
    let user_id = authorize_account(&state, &user, Action::View, &id)?;

    let response = state.user_service.get_user(user_id).await?;
    ok(response)
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 409, description = "Email already in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<UserResponse> {
    debug!("Update user request: {}", id);
    let user_id = authorize_account(&state, &user, Action::Update, &id)?;

    let response = state.user_service.update_profile(user_id, request).await?;
    ok(response)
}

/// Changes a user's role (admin only).
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/role",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = UserResponse),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_role(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<ChangeRoleRequest>,
) -> ApiResult<UserResponse> {
    debug!("Change role request: {} -> {}", id, request.role);
    let user_id = authorize_account(&state, &user, Action::Administer, &id)?;

    let response = state.user_service.change_role(user_id, request).await?;
    ok(response)
}

/// Changes a user's status (admin only).
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/status",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    request_body = ChangeStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = UserResponse),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<ChangeStatusRequest>,
) -> ApiResult<UserResponse> {
    debug!("Change status request: {} -> {}", id, request.status);
    let user_id = authorize_account(&state, &user, Action::Administer, &id)?;

    let response = state.user_service.change_status(user_id, request).await?;
    ok(response)
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "Unknown user")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    debug!("Delete user request: {}", id);
    let user_id = authorize_account(&state, &user, Action::Delete, &id)?;

    state.user_service.delete_user(user_id).await?;
    Ok(no_content())
}
