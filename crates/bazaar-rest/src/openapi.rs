//! OpenAPI documentation.

use crate::controllers::{ComponentHealth, HealthResponse, ReadinessResponse};
use bazaar_core::{
    Category, CategoryId, CategoryNode, ErrorResponse, FieldError, Question, QuestionId,
    QuestionKind, UserId, UserRole, UserStatus,
};
use bazaar_service::{
    AuthResponse, ChangeRoleRequest, ChangeStatusRequest, CreateCategoryRequest,
    CreateQuestionRequest, IssuedToken, LoginRequest, MessageResponse, PricingResponse,
    RegisterRequest, UpdateCategoryRequest, UpdateProfileRequest, UpdateQuestionRequest,
    UserIdentity, UserResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI document for the Bazaar API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bazaar Marketplace API",
        version = "1.0.0",
        description = "Category taxonomy, accounts, and marketplace settings",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        crate::controllers::catalog_controller::get_categories_with_questions,
        crate::controllers::catalog_controller::get_questions_by_category,
        crate::controllers::catalog_controller::get_category,
        crate::controllers::catalog_controller::create_category,
        crate::controllers::catalog_controller::update_category,
        crate::controllers::catalog_controller::delete_category,
        crate::controllers::catalog_controller::create_question,
        crate::controllers::catalog_controller::update_question,
        crate::controllers::catalog_controller::delete_question,
        crate::controllers::auth_controller::register,
        crate::controllers::auth_controller::login,
        crate::controllers::auth_controller::logout,
        crate::controllers::auth_controller::logout_all,
        crate::controllers::auth_controller::me,
        crate::controllers::user_controller::get_user,
        crate::controllers::user_controller::update_user,
        crate::controllers::user_controller::change_role,
        crate::controllers::user_controller::change_status,
        crate::controllers::user_controller::delete_user,
        crate::controllers::pricing_controller::get_pricing,
        crate::controllers::health_controller::health_check,
        crate::controllers::health_controller::readiness_check,
        crate::controllers::health_controller::liveness_check,
    ),
    components(
        schemas(
            CategoryId,
            QuestionId,
            UserId,
            UserRole,
            UserStatus,
            Category,
            CategoryNode,
            Question,
            QuestionKind,
            ErrorResponse,
            FieldError,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CreateQuestionRequest,
            UpdateQuestionRequest,
            LoginRequest,
            RegisterRequest,
            IssuedToken,
            AuthResponse,
            UserIdentity,
            MessageResponse,
            UpdateProfileRequest,
            ChangeRoleRequest,
            ChangeStatusRequest,
            UserResponse,
            PricingResponse,
            HealthResponse,
            ComponentHealth,
            ReadinessResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "catalog", description = "Categories and their attribute questions"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management endpoints"),
        (name = "pricing", description = "Marketplace pricing settings"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "JWT bearer token. Browsers may send it as the access_token cookie instead.",
                        ))
                        .build(),
                ),
            );
        }
    }
}
