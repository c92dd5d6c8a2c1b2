//! Dynamic attribute questions attached to categories.

use crate::{BazaarError, BazaarResult, CategoryId, QuestionId};
use serde::{Deserialize, Serialize};

/// The answer type a question expects.
///
/// Serialized flat next to the owning question as a `type` tag, with an
/// `options` array only for `select`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionKind {
    /// One of a fixed list of choices.
    Select { options: Vec<String> },
    Number,
    Text,
    Boolean,
}

impl QuestionKind {
    /// Storage name of the kind.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Select { .. } => "select",
            Self::Number => "number",
            Self::Text => "text",
            Self::Boolean => "boolean",
        }
    }

    /// Choices for `select`, `None` for every other kind.
    #[must_use]
    pub fn options(&self) -> Option<&[String]> {
        match self {
            Self::Select { options } => Some(options),
            _ => None,
        }
    }

    /// Rebuilds a kind from its stored columns.
    ///
    /// A `select` must carry at least one option; other kinds must carry none.
    pub fn from_parts(type_name: &str, options: Option<Vec<String>>) -> BazaarResult<Self> {
        match (type_name, options) {
            ("select", Some(options)) if !options.is_empty() => Ok(Self::Select { options }),
            ("select", _) => Err(BazaarError::validation(
                "select questions require at least one option",
            )),
            ("number" | "text" | "boolean", Some(options)) if !options.is_empty() => {
                Err(BazaarError::validation(format!(
                    "{type_name} questions do not take options"
                )))
            }
            ("number", _) => Ok(Self::Number),
            ("text", _) => Ok(Self::Text),
            ("boolean", _) => Ok(Self::Boolean),
            (other, _) => Err(BazaarError::validation(format!(
                "unknown question type: {other}"
            ))),
        }
    }
}

/// A typed attribute definition owned by exactly one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Question {
    pub id: QuestionId,
    pub category_id: CategoryId,
    pub question: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    /// Sort key within the category; ties fall back to `id`.
    #[serde(default, skip_serializing)]
    pub position: i32,
}

/// Fields for a question that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub category_id: CategoryId,
    pub question: String,
    pub kind: QuestionKind,
    pub position: i32,
}

/// Orders questions by `position`, then `id`.
pub fn sort_questions(questions: &mut [Question]) {
    questions.sort_by_key(|q| (q.position, q.id));
}
