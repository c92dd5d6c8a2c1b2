//! In-memory repositories shared by the service tests.

use crate::cache::CacheInterface;
use async_trait::async_trait;
use bazaar_core::{
    sort_questions, AccessToken, BazaarError, BazaarResult, Category, CategoryId, Email,
    NewCategory, NewQuestion, Question, QuestionId, TokenId, User, UserId,
};
use bazaar_repository::{
    AccessTokenRepository, CategoryRepository, QuestionRepository, UserRepository,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;
use parking_lot::Mutex;

/// Categories and questions sharing one store, so deletes cascade.
#[derive(Default)]
pub struct InMemoryCatalog {
    categories: Mutex<BTreeMap<CategoryId, Category>>,
    questions: Mutex<BTreeMap<QuestionId, Question>>,
    next_id: AtomicI64,
    pub category_loads: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn loads(&self) -> usize {
        self.category_loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCatalog {
    async fn find_all(&self) -> BazaarResult<Vec<Category>> {
        self.category_loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.categories.lock().values().cloned().collect())
    }

    async fn find_by_id(&self, id: CategoryId) -> BazaarResult<Option<Category>> {
        Ok(self.categories.lock().get(&id).cloned())
    }

    async fn find_by_name(
        &self,
        name: &str,
        parent_id: Option<CategoryId>,
    ) -> BazaarResult<Option<Category>> {
        Ok(self
            .categories
            .lock()
            .values()
            .find(|c| c.name == name && c.parent_id == parent_id)
            .cloned())
    }

    async fn save(&self, category: &NewCategory) -> BazaarResult<Category> {
        let now = Utc::now();
        let saved = Category {
            id: CategoryId(self.next()),
            name: category.name.clone(),
            parent_id: category.parent_id,
            created_at: now,
            updated_at: now,
        };
        self.categories
            .lock()
            .insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn update(&self, category: &Category) -> BazaarResult<Category> {
        let mut categories = self.categories.lock();
        let stored = categories
            .get_mut(&category.id)
            .ok_or_else(|| BazaarError::not_found("Category", category.id))?;
        stored.name = category.name.clone();
        stored.parent_id = category.parent_id;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: CategoryId) -> BazaarResult<bool> {
        let removed = self.categories.lock().remove(&id).is_some();
        if removed {
            self.questions
                .lock()
                .retain(|_, q| q.category_id != id);
        }
        Ok(removed)
    }

    async fn count_children(&self, id: CategoryId) -> BazaarResult<u64> {
        Ok(self
            .categories
            .lock()
            .values()
            .filter(|c| c.parent_id == Some(id))
            .count() as u64)
    }
}

#[async_trait]
impl QuestionRepository for InMemoryCatalog {
    async fn find_all(&self) -> BazaarResult<Vec<Question>> {
        let mut questions: Vec<Question> =
            self.questions.lock().values().cloned().collect();
        questions.sort_by_key(|q| (q.category_id, q.position, q.id));
        Ok(questions)
    }

    async fn find_by_category(&self, category_id: CategoryId) -> BazaarResult<Vec<Question>> {
        let mut questions: Vec<Question> = self
            .questions
            .lock()
            .values()
            .filter(|q| q.category_id == category_id)
            .cloned()
            .collect();
        sort_questions(&mut questions);
        Ok(questions)
    }

    async fn find_by_id(&self, id: QuestionId) -> BazaarResult<Option<Question>> {
        Ok(self.questions.lock().get(&id).cloned())
    }

    async fn save(&self, question: &NewQuestion) -> BazaarResult<Question> {
        if !self
            .categories
            .lock()
            .contains_key(&question.category_id)
        {
            return Err(BazaarError::conflict("category does not exist"));
        }
        let saved = Question {
            id: QuestionId(self.next()),
            category_id: question.category_id,
            question: question.question.clone(),
            kind: question.kind.clone(),
            position: question.position,
        };
        self.questions
            .lock()
            .insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn update(&self, question: &Question) -> BazaarResult<Question> {
        let mut questions = self.questions.lock();
        if !questions.contains_key(&question.id) {
            return Err(BazaarError::not_found("Question", question.id));
        }
        questions.insert(question.id, question.clone());
        Ok(question.clone())
    }

    async fn delete(&self, id: QuestionId) -> BazaarResult<bool> {
        Ok(self.questions.lock().remove(&id).is_some())
    }
}

/// Users and their token records.
#[derive(Default)]
pub struct InMemoryAccounts {
    users: Mutex<HashMap<UserId, User>>,
    tokens: Mutex<HashMap<TokenId, AccessToken>>,
    pub user_loads: AtomicUsize,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(username: &str) -> (Self, User) {
        let accounts = Self::new();
        let user = User::new(
            username.to_string(),
            Email::new_unchecked(format!("{username}@example.com")),
            String::new(),
        );
        accounts
            .users
            .lock()
            .insert(user.id, user.clone());
        (accounts, user)
    }

    pub fn insert_token(&self, token: AccessToken) {
        self.tokens.lock().insert(token.id, token);
    }

    pub fn token(&self, id: TokenId) -> Option<AccessToken> {
        self.tokens.lock().get(&id).cloned()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.lock().len()
    }

    pub fn loads(&self) -> usize {
        self.user_loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepository for InMemoryAccounts {
    async fn find_by_id(&self, id: UserId) -> BazaarResult<Option<User>> {
        self.user_loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.lock().get(&id).cloned())
    }

    async fn find_by_username_or_email(&self, identifier: &str) -> BazaarResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .values()
            .find(|u| {
                u.username == identifier || u.email.as_str().eq_ignore_ascii_case(identifier)
            })
            .cloned())
    }

    async fn exists_by_username(&self, username: &str) -> BazaarResult<bool> {
        Ok(self
            .users
            .lock()
            .values()
            .any(|u| u.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> BazaarResult<bool> {
        Ok(self
            .users
            .lock()
            .values()
            .any(|u| u.email.as_str().eq_ignore_ascii_case(email)))
    }

    async fn save(&self, user: &User) -> BazaarResult<User> {
        self.users.lock().insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> BazaarResult<User> {
        let mut users = self.users.lock();
        if !users.contains_key(&user.id) {
            return Err(BazaarError::not_found("User", user.id));
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> BazaarResult<bool> {
        let removed = self.users.lock().remove(&id).is_some();
        self.tokens.lock().retain(|_, t| t.user_id != id);
        Ok(removed)
    }
}

#[async_trait]
impl AccessTokenRepository for InMemoryAccounts {
    async fn find_by_id(&self, id: TokenId) -> BazaarResult<Option<AccessToken>> {
        Ok(self.token(id))
    }

    async fn save(&self, token: &AccessToken) -> BazaarResult<()> {
        self.insert_token(token.clone());
        Ok(())
    }

    async fn delete(&self, id: TokenId) -> BazaarResult<bool> {
        Ok(self.tokens.lock().remove(&id).is_some())
    }

    async fn delete_by_user(&self, user_id: UserId) -> BazaarResult<u64> {
        let mut tokens = self.tokens.lock();
        let before = tokens.len();
        tokens.retain(|_, t| t.user_id != user_id);
        Ok((before - tokens.len()) as u64)
    }

    async fn touch(&self, id: TokenId, at: DateTime<Utc>) -> BazaarResult<()> {
        if let Some(token) = self.tokens.lock().get_mut(&id) {
            token.last_used_at = Some(at);
        }
        Ok(())
    }
}

/// Cache backend that is down: every call fails.
#[derive(Debug, Default)]
pub struct UnreachableCache;

impl UnreachableCache {
    fn refused<T>() -> BazaarResult<T> {
        Err(BazaarError::Cache("connection refused".to_string()))
    }
}

#[async_trait]
impl CacheInterface for UnreachableCache {
    async fn get_raw(&self, _key: &str) -> BazaarResult<Option<String>> {
        Self::refused()
    }

    async fn set_raw(&self, _key: &str, _value: &str, _ttl: Duration) -> BazaarResult<()> {
        Self::refused()
    }

    async fn delete(&self, _key: &str) -> BazaarResult<bool> {
        Self::refused()
    }

    async fn exists(&self, _key: &str) -> BazaarResult<bool> {
        Self::refused()
    }

    async fn try_lock(&self, _key: &str, _ttl: Duration) -> BazaarResult<Option<String>> {
        Self::refused()
    }

    async fn unlock(&self, _key: &str, _token: &str) -> BazaarResult<bool> {
        Self::refused()
    }
}
