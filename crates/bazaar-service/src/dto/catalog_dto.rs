//! Catalog administration DTOs.

use bazaar_core::{rules, BazaarResult, CategoryId, QuestionKind};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request to create a category.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "rules::not_blank")
    )]
    pub name: String,

    /// Parent category; omit for a root.
    pub parent_id: Option<CategoryId>,
}

/// Request to rename and/or re-parent a category.
///
/// `parent_id` distinguishes "absent" (keep the parent) from `null`
/// (make the category a root).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "rules::not_blank")
    )]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<i64>)]
    pub parent_id: Option<Option<CategoryId>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Request to add a question to a category.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateQuestionRequest {
    #[validate(
        length(min = 1, max = 255, message = "Question must be 1-255 characters"),
        custom(function = "rules::not_blank")
    )]
    pub question: String,

    /// One of `select`, `number`, `text`, `boolean`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Choices; required for `select`, rejected otherwise.
    #[validate(length(max = 100), custom(function = "rules::distinct_options"))]
    pub options: Option<Vec<String>>,

    /// Sort key within the category. Defaults to after the last question.
    pub position: Option<i32>,
}

impl CreateQuestionRequest {
    /// Resolves `type` and `options` into a typed kind.
    pub fn question_kind(&self) -> BazaarResult<QuestionKind> {
        QuestionKind::from_parts(&self.kind, self.options.clone())
    }
}

/// Request to edit a question. Absent fields keep their current value.
///
/// Changing `type` requires sending `options` that fit the new type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateQuestionRequest {
    #[validate(
        length(min = 1, max = 255, message = "Question must be 1-255 characters"),
        custom(function = "rules::not_blank")
    )]
    pub question: Option<String>,

    #[serde(rename = "type")]
    pub kind: Option<String>,

    #[validate(length(max = 100), custom(function = "rules::distinct_options"))]
    pub options: Option<Vec<String>>,

    pub position: Option<i32>,
}

impl UpdateQuestionRequest {
    /// Applies the requested type and options over `current`.
    ///
    /// Sending only `options` replaces the choices of a `select`.
    pub fn merge_kind(&self, current: &QuestionKind) -> BazaarResult<QuestionKind> {
        match (&self.kind, &self.options) {
            (None, None) => Ok(current.clone()),
            (Some(kind), options) => QuestionKind::from_parts(kind, options.clone()),
            (None, Some(options)) => {
                QuestionKind::from_parts(current.type_name(), Some(options.clone()))
            }
        }
    }
}
