//! MySQL question repository.

use crate::{traits::QuestionRepository, DatabasePool};
use async_trait::async_trait;
use bazaar_core::{
    BazaarError, BazaarResult, CategoryId, NewQuestion, Question, QuestionId, QuestionKind,
};
use sqlx::types::Json;
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;

/// MySQL-backed [`QuestionRepository`].
///
/// The question kind lives in a `type` column plus a nullable JSON `options`
/// array.
#[derive(Clone)]
pub struct MySqlQuestionRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlQuestionRepository {
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct QuestionRow {
    id: i64,
    category_id: i64,
    question: String,
    #[sqlx(rename = "type")]
    kind: String,
    options: Option<Json<Vec<String>>>,
    position: i32,
}

impl TryFrom<QuestionRow> for Question {
    type Error = BazaarError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let kind = QuestionKind::from_parts(&row.kind, row.options.map(|Json(options)| options))
            .map_err(|e| BazaarError::Internal(format!("Corrupt question {}: {e}", row.id)))?;

        Ok(Self {
            id: QuestionId(row.id),
            category_id: CategoryId(row.category_id),
            question: row.question,
            kind,
            position: row.position,
        })
    }
}

fn options_column(kind: &QuestionKind) -> Option<Json<Vec<String>>> {
    kind.options().map(|options| Json(options.to_vec()))
}

const SELECT_COLUMNS: &str = "SELECT id, category_id, question, type, options, position FROM questions";

#[async_trait]
impl QuestionRepository for MySqlQuestionRepository {
    async fn find_all(&self) -> BazaarResult<Vec<Question>> {
        debug!("Loading all questions");

        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            "{SELECT_COLUMNS} ORDER BY category_id, position, id"
        ))
        .fetch_all(self.pool.inner())
        .await?;

        rows.into_iter().map(Question::try_from).collect()
    }

    async fn find_by_category(&self, category_id: CategoryId) -> BazaarResult<Vec<Question>> {
        debug!("Loading questions for category: {}", category_id);

        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            "{SELECT_COLUMNS} WHERE category_id = ? ORDER BY position, id"
        ))
        .bind(category_id.value())
        .fetch_all(self.pool.inner())
        .await?;

        rows.into_iter().map(Question::try_from).collect()
    }

    async fn find_by_id(&self, id: QuestionId) -> BazaarResult<Option<Question>> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.value())
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(Question::try_from).transpose()
    }

    async fn save(&self, question: &NewQuestion) -> BazaarResult<Question> {
        debug!("Saving question for category: {}", question.category_id);

        let result = sqlx::query(
            "INSERT INTO questions (category_id, question, type, options, position) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(question.category_id.value())
        .bind(&question.question)
        .bind(question.kind.type_name())
        .bind(options_column(&question.kind))
        .bind(question.position)
        .execute(self.pool.inner())
        .await?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|_| BazaarError::internal("question id out of range"))?;

        self.find_by_id(QuestionId(id))
            .await?
            .ok_or_else(|| BazaarError::internal("Failed to fetch inserted question"))
    }

    async fn update(&self, question: &Question) -> BazaarResult<Question> {
        debug!("Updating question: {}", question.id);

        sqlx::query(
            r#"
            UPDATE questions
            SET question = ?, type = ?, options = ?, position = ?, updated_at = CURRENT_TIMESTAMP(6)
            WHERE id = ?
            "#,
        )
        .bind(&question.question)
        .bind(question.kind.type_name())
        .bind(options_column(&question.kind))
        .bind(question.position)
        .bind(question.id.value())
        .execute(self.pool.inner())
        .await?;

        self.find_by_id(question.id)
            .await?
            .ok_or_else(|| BazaarError::not_found("Question", question.id))
    }

    async fn delete(&self, id: QuestionId) -> BazaarResult<bool> {
        debug!("Deleting question: {}", id);

        let result = sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(id.value())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl std::fmt::Debug for MySqlQuestionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlQuestionRepository").finish_non_exhaustive()
    }
}
