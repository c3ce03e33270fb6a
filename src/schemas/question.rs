use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Question;
use crate::db::types::{DifficultyLevel, QuestionKind};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CreateQuestionRequest {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub(crate) text: String,
    pub(crate) kind: QuestionKind,
    #[serde(default)]
    pub(crate) choices: Vec<String>,
    #[serde(default)]
    pub(crate) correct_answer: String,
    #[validate(range(min = 1, message = "points must be at least 1"))]
    pub(crate) points: i32,
    #[serde(default = "default_difficulty")]
    pub(crate) difficulty: DifficultyLevel,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UpdateQuestionRequest {
    #[serde(default)]
    pub(crate) text: Option<String>,
    #[serde(default)]
    pub(crate) choices: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) correct_answer: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, message = "points must be at least 1"))]
    pub(crate) points: Option<i32>,
    #[serde(default)]
    pub(crate) difficulty: Option<DifficultyLevel>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) text: String,
    pub(crate) kind: QuestionKind,
    pub(crate) choices: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) correct_answer: Option<String>,
    pub(crate) points: i32,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) created_by: String,
    pub(crate) created_at: String,
}

impl QuestionResponse {
    /// Full view, including the correct answer. Examiner and admin only.
    pub(crate) fn from_db(question: Question) -> Self {
        Self {
            id: question.id,
            text: question.text,
            kind: question.kind,
            choices: question.choices.0,
            correct_answer: Some(question.correct_answer),
            points: question.points,
            difficulty: question.difficulty,
            created_by: question.created_by,
            created_at: format_primitive(question.created_at),
        }
    }

    /// Student view: the correct answer is stripped.
    pub(crate) fn from_db_redacted(question: Question) -> Self {
        let mut response = Self::from_db(question);
        response.correct_answer = None;
        response
    }
}
fn default_difficulty() -> DifficultyLevel {
    DifficultyLevel::Medium
}
