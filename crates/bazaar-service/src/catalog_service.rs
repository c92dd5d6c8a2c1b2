//! Category taxonomy and dynamic attribute questions.

use crate::dto::{
    CreateCategoryRequest, CreateQuestionRequest, UpdateCategoryRequest, UpdateQuestionRequest,
};
use async_trait::async_trait;
use bazaar_core::{
    BazaarResult, Category, CategoryId, CategoryNode, Interface, Question, QuestionId,
};

/// Catalog reads and administration.
#[async_trait]
pub trait CatalogService: Interface + Send + Sync {
    /// Root categories with nested children and questions.
    ///
    /// Served from a cached snapshot that is only refreshed when its TTL
    /// runs out; writes through this service do not invalidate it.
    async fn get_categories_with_questions(&self) -> BazaarResult<Vec<CategoryNode>>;

    /// Questions of one category read straight from the store, ordered by
    /// position then id. Unknown categories yield an empty list.
    async fn get_questions_by_category(&self, category_id: CategoryId) -> BazaarResult<Vec<Question>>;

    async fn get_category(&self, id: CategoryId) -> BazaarResult<Category>;

    async fn create_category(&self, request: CreateCategoryRequest) -> BazaarResult<Category>;

    /// Renames and/or moves a category. Moves that would make the category
    /// its own ancestor are rejected.
    async fn update_category(&self, id: CategoryId, request: UpdateCategoryRequest) -> BazaarResult<Category>;

    /// Deletes a leaf category and its questions.
    async fn delete_category(&self, id: CategoryId) -> BazaarResult<()>;

    async fn create_question(
        &self,
        category_id: CategoryId,
        request: CreateQuestionRequest,
    ) -> BazaarResult<Question>;

    async fn update_question(&self, id: QuestionId, request: UpdateQuestionRequest) -> BazaarResult<Question>;

    async fn delete_question(&self, id: QuestionId) -> BazaarResult<()>;
}
