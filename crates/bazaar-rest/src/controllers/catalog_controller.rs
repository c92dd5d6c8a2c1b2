//! Category and question controller.

use crate::{
    extractors::{AuthenticatedUser, ValidatedJson},
    responses::{created, no_content, ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use bazaar_core::{Category, CategoryId, CategoryNode, Question, QuestionId};
use bazaar_security::{Action, AuthorizationTarget, AuthorizerExt};
use bazaar_service::{
    CreateCategoryRequest, CreateQuestionRequest, UpdateCategoryRequest, UpdateQuestionRequest,
};
use tracing::debug;

/// Creates the catalog router.
///
/// Reads are public. Writes need an actor the catalog policy allows.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(get_categories_with_questions).post(create_category))
        .route(
            "/categories/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route(
            "/categories/:id/questions",
            get(get_questions_by_category).post(create_question),
        )
        .route("/questions/:id", put(update_question).delete(delete_question))
}

fn authorize(
    state: &AppState,
    user: &AuthenticatedUser,
    action: Action,
    target: AuthorizationTarget,
) -> Result<(), AppError> {
    state.authorizer.authorize(&user.actor(), action, &target)?;
    Ok(())
}

/// The full category taxonomy with each category's questions.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "catalog",
    responses(
        (status = 200, description = "Root categories with nested children and questions", body = [CategoryNode])
    )
)]
pub async fn get_categories_with_questions(
    State(state): State<AppState>,
) -> ApiResult<Vec<CategoryNode>> {
    let tree = state.catalog_service.get_categories_with_questions().await?;
    ok(tree)
}

/// Questions of one category, ordered by position.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}/questions",
    tag = "catalog",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Questions, empty for an unknown category", body = [Question])
    )
)]
pub async fn get_questions_by_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> ApiResult<Vec<Question>> {
    let questions = state.catalog_service.get_questions_by_category(id).await?;
    ok(questions)
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Unknown category")
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> ApiResult<Category> {
    let category = state.catalog_service.get_category(id).await?;
    ok(category)
}

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "catalog",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 403, description = "Not allowed to edit the catalog"),
        (status = 409, description = "Sibling with the same name exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>), AppError> {
    debug!("Create category request: {}", request.name);
    authorize(&state, &user, Action::Create, AuthorizationTarget::Category)?;

    let category = state.catalog_service.create_category(request).await?;
    Ok(created(category))
}

/// Renames and/or moves a category.
#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Category id")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Move would create a cycle"),
        (status = 404, description = "Unknown category or parent")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<CategoryId>,
    ValidatedJson(request): ValidatedJson<UpdateCategoryRequest>,
) -> ApiResult<Category> {
    debug!("Update category request: {}", id);
    authorize(&state, &user, Action::Update, AuthorizationTarget::Category)?;

    let category = state.catalog_service.update_category(id, request).await?;
    ok(category)
}

#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 409, description = "Category still has children")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode, AppError> {
    debug!("Delete category request: {}", id);
    authorize(&state, &user, Action::Delete, AuthorizationTarget::Category)?;

    state.catalog_service.delete_category(id).await?;
    Ok(no_content())
}

#[utoipa::path(
    post,
    path = "/api/v1/categories/{id}/questions",
    tag = "catalog",
    params(("id" = i64, Path, description = "Category id")),
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = Question),
        (status = 404, description = "Unknown category")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_question(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<CategoryId>,
    ValidatedJson(request): ValidatedJson<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Question>>), AppError> {
    debug!("Create question request for category: {}", id);
    authorize(&state, &user, Action::Create, AuthorizationTarget::Question)?;

    let question = state.catalog_service.create_question(id, request).await?;
    Ok(created(question))
}

#[utoipa::path(
    put,
    path = "/api/v1/questions/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Question id")),
    request_body = UpdateQuestionRequest,
    responses(
        (status = 200, description = "Question updated", body = Question),
        (status = 404, description = "Unknown question")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_question(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<QuestionId>,
    ValidatedJson(request): ValidatedJson<UpdateQuestionRequest>,
) -> ApiResult<Question> {
    debug!("Update question request: {}", id);
    authorize(&state, &user, Action::Update, AuthorizationTarget::Question)?;

    let question = state.catalog_service.update_question(id, request).await?;
    ok(question)
}

#[utoipa::path(
    delete,
    path = "/api/v1/questions/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Question id")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 404, description = "Unknown question")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_question(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<QuestionId>,
) -> Result<StatusCode, AppError> {
    debug!("Delete question request: {}", id);
    authorize(&state, &user, Action::Delete, AuthorizationTarget::Question)?;

    state.catalog_service.delete_question(id).await?;
    Ok(no_content())
}
