use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{DifficultyLevel, QuestionKind, SubmissionStatus, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) full_name: String,
    pub(crate) hashed_password: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) text: String,
    pub(crate) kind: QuestionKind,
    pub(crate) choices: Json<Vec<String>>,
    pub(crate) correct_answer: String,
    pub(crate) points: i32,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Exam {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) duration_minutes: i32,
    pub(crate) passing_score: i32,
    pub(crate) total_points: i32,
    pub(crate) question_ids: Json<Vec<String>>,
    pub(crate) is_published: bool,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// One graded answer, embedded in the submission row as JSONB.
/// `evaluated_*` fields are set only by a manual evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct GradedAnswer {
    pub(crate) question_id: String,
    pub(crate) correct: bool,
    pub(crate) points_awarded: i32,
    pub(crate) max_points: i32,
    pub(crate) needs_manual_evaluation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) student_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) evaluated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) evaluated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Submission {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) student_id: String,
    pub(crate) answers: Json<Vec<GradedAnswer>>,
    pub(crate) score: i32,
    /// Snapshot at submit time; later question edits do not touch it.
    pub(crate) total_points: i32,
    pub(crate) percentage_score: f64,
    pub(crate) time_taken_seconds: i64,
    pub(crate) tab_switch_count: i32,
    pub(crate) status: SubmissionStatus,
    pub(crate) needs_manual_evaluation: bool,
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) evaluated_by: Option<String>,
    pub(crate) evaluated_at: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct HistoryEntry {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) exam_id: String,
    pub(crate) score: i32,
    pub(crate) passed: bool,
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) time_taken_seconds: i64,
    pub(crate) certificate_generated: bool,
    pub(crate) certificate_url: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}
