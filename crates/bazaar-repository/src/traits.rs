//! Repository trait definitions.

use async_trait::async_trait;
use bazaar_core::{
    AccessToken, BazaarResult, Category, CategoryId, Interface, NewCategory, NewQuestion, Question,
    QuestionId, TokenId, User, UserId,
};
use chrono::{DateTime, Utc};

/// Storage for the category taxonomy.
#[async_trait]
pub trait CategoryRepository: Interface + Send + Sync {
    /// Every category, ordered by id.
    async fn find_all(&self) -> BazaarResult<Vec<Category>>;

    async fn find_by_id(&self, id: CategoryId) -> BazaarResult<Option<Category>>;

    /// Looks up a category by name under a given parent (`None` for roots).
    async fn find_by_name(
        &self,
        name: &str,
        parent_id: Option<CategoryId>,
    ) -> BazaarResult<Option<Category>>;

    async fn save(&self, category: &NewCategory) -> BazaarResult<Category>;

    /// Persists name and parent changes.
    async fn update(&self, category: &Category) -> BazaarResult<Category>;

    /// Deletes a category and, through the schema, its questions.
    async fn delete(&self, id: CategoryId) -> BazaarResult<bool>;

    async fn count_children(&self, id: CategoryId) -> BazaarResult<u64>;
}

/// Storage for per-category questions.
#[async_trait]
pub trait QuestionRepository: Interface + Send + Sync {
    /// Every question, ordered by category, position, then id.
    async fn find_all(&self) -> BazaarResult<Vec<Question>>;

    /// Questions of one category ordered by position, then id. Empty for an
    /// unknown category.
    async fn find_by_category(&self, category_id: CategoryId) -> BazaarResult<Vec<Question>>;

    async fn find_by_id(&self, id: QuestionId) -> BazaarResult<Option<Question>>;

    async fn save(&self, question: &NewQuestion) -> BazaarResult<Question>;

    async fn update(&self, question: &Question) -> BazaarResult<Question>;

    async fn delete(&self, id: QuestionId) -> BazaarResult<bool>;
}

/// Storage for accounts.
#[async_trait]
pub trait UserRepository: Interface + Send + Sync {
    async fn find_by_id(&self, id: UserId) -> BazaarResult<Option<User>>;

    /// Matches the username exactly or the email case-insensitively.
    async fn find_by_username_or_email(&self, identifier: &str) -> BazaarResult<Option<User>>;

    async fn exists_by_username(&self, username: &str) -> BazaarResult<bool>;

    async fn exists_by_email(&self, email: &str) -> BazaarResult<bool>;

    async fn save(&self, user: &User) -> BazaarResult<User>;

    async fn update(&self, user: &User) -> BazaarResult<User>;

    async fn delete(&self, id: UserId) -> BazaarResult<bool>;
}

/// Storage for server-side access token records.
#[async_trait]
pub trait AccessTokenRepository: Interface + Send + Sync {
    async fn find_by_id(&self, id: TokenId) -> BazaarResult<Option<AccessToken>>;

    async fn save(&self, token: &AccessToken) -> BazaarResult<()>;

    /// Removes a record. Returns `false` if it was already gone.
    async fn delete(&self, id: TokenId) -> BazaarResult<bool>;

    /// Removes every record of a user, returning how many were deleted.
    async fn delete_by_user(&self, user_id: UserId) -> BazaarResult<u64>;

    /// Records that the token authenticated a request.
    async fn touch(&self, id: TokenId, at: DateTime<Utc>) -> BazaarResult<()>;
}
