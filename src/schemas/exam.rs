use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Exam;
use crate::schemas::question::QuestionResponse;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CreateExamRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[validate(range(min = 1, message = "duration_minutes must be at least 1"))]
    pub(crate) duration_minutes: i32,
    #[validate(range(min = 0, max = 100, message = "passing_score must be between 0 and 100"))]
    pub(crate) passing_score: i32,
    #[validate(length(min = 1, message = "question_ids must not be empty"))]
    pub(crate) question_ids: Vec<String>,
    #[serde(default)]
    pub(crate) is_published: bool,
}

/// Update payload. Once an exam has submissions only the fields that cannot
/// retroactively change already-graded attempts may be set; the handler
/// rejects the rest.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UpdateExamRequest {
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, message = "duration_minutes must be at least 1"))]
    pub(crate) duration_minutes: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0, max = 100, message = "passing_score must be between 0 and 100"))]
    pub(crate) passing_score: Option<i32>,
    #[serde(default)]
    pub(crate) question_ids: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) is_published: Option<bool>,
}

impl UpdateExamRequest {
    pub(crate) fn touches_grading_fields(&self) -> bool {
        self.duration_minutes.is_some()
            || self.passing_score.is_some()
            || self.question_ids.is_some()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) duration_minutes: i32,
    pub(crate) passing_score: i32,
    pub(crate) total_points: i32,
    pub(crate) question_ids: Vec<String>,
    pub(crate) is_published: bool,
    pub(crate) created_by: String,
    pub(crate) created_at: String,
}

impl ExamResponse {
    pub(crate) fn from_db(exam: Exam) -> Self {
        Self {
            id: exam.id,
            title: exam.title,
            description: exam.description,
            duration_minutes: exam.duration_minutes,
            passing_score: exam.passing_score,
            total_points: exam.total_points,
            question_ids: exam.question_ids.0,
            is_published: exam.is_published,
            created_by: exam.created_by,
            created_at: format_primitive(exam.created_at),
        }
    }
}

/// Detail view with the resolved questions inlined. For students the
/// questions arrive redacted.
#[derive(Debug, Serialize)]
pub(crate) struct ExamDetailResponse {
    #[serde(flatten)]
    pub(crate) exam: ExamResponse,
    pub(crate) questions: Vec<QuestionResponse>,
}
