//! MySQL category repository.

use crate::{traits::CategoryRepository, DatabasePool};
use async_trait::async_trait;
use bazaar_core::{BazaarError, BazaarResult, Category, CategoryId, NewCategory};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;

/// MySQL-backed [`CategoryRepository`].
#[derive(Clone)]
pub struct MySqlCategoryRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlCategoryRepository {
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    parent_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId(row.id),
            name: row.name,
            parent_id: row.parent_id.map(CategoryId),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CategoryRepository for MySqlCategoryRepository {
    async fn find_all(&self) -> BazaarResult<Vec<Category>> {
        debug!("Loading all categories");

        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, parent_id, created_at, updated_at FROM categories ORDER BY id",
        )
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn find_by_id(&self, id: CategoryId) -> BazaarResult<Option<Category>> {
        debug!("Finding category by id: {}", id);

        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, parent_id, created_at, updated_at FROM categories WHERE id = ?",
        )
        .bind(id.value())
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(Category::from))
    }

    async fn find_by_name(
        &self,
        name: &str,
        parent_id: Option<CategoryId>,
    ) -> BazaarResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, parent_id, created_at, updated_at
            FROM categories
            WHERE name = ? AND parent_id <=> ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(name)
        .bind(parent_id.map(CategoryId::value))
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(Category::from))
    }

    async fn save(&self, category: &NewCategory) -> BazaarResult<Category> {
        debug!("Saving new category: {}", category.name);

        let result = sqlx::query("INSERT INTO categories (name, parent_id) VALUES (?, ?)")
            .bind(&category.name)
            .bind(category.parent_id.map(CategoryId::value))
            .execute(self.pool.inner())
            .await?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|_| BazaarError::internal("category id out of range"))?;

        self.find_by_id(CategoryId(id))
            .await?
            .ok_or_else(|| BazaarError::internal("Failed to fetch inserted category"))
    }

    async fn update(&self, category: &Category) -> BazaarResult<Category> {
        debug!("Updating category: {}", category.id);

        sqlx::query(
            "UPDATE categories SET name = ?, parent_id = ?, updated_at = CURRENT_TIMESTAMP(6) WHERE id = ?",
        )
        .bind(&category.name)
        .bind(category.parent_id.map(CategoryId::value))
        .bind(category.id.value())
        .execute(self.pool.inner())
        .await?;

        self.find_by_id(category.id)
            .await?
            .ok_or_else(|| BazaarError::not_found("Category", category.id))
    }

    async fn delete(&self, id: CategoryId) -> BazaarResult<bool> {
        debug!("Deleting category: {}", id);

        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id.value())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_children(&self, id: CategoryId) -> BazaarResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE parent_id = ?")
            .bind(id.value())
            .fetch_one(self.pool.inner())
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

impl std::fmt::Debug for MySqlCategoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlCategoryRepository").finish_non_exhaustive()
    }
}
