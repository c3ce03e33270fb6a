use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{GradedAnswer, Submission};
use crate::db::types::SubmissionStatus;

#[derive(Debug, Deserialize)]
pub(crate) struct RawAnswer {
    pub(crate) question_id: String,
    pub(crate) answer: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SubmitExamRequest {
    #[serde(default)]
    pub(crate) answers: Vec<RawAnswer>,
    #[validate(range(min = 0, message = "time_taken_seconds must be non-negative"))]
    pub(crate) time_taken_seconds: i64,
    #[serde(default)]
    #[validate(range(min = 0, message = "tab_switch_count must be non-negative"))]
    pub(crate) tab_switch_count: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitExamResponse {
    pub(crate) submission_id: String,
    pub(crate) score: i32,
    pub(crate) total_points: i32,
    pub(crate) percentage_score: f64,
    pub(crate) passed: bool,
    pub(crate) status: SubmissionStatus,
    pub(crate) needs_manual_evaluation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) certificate_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct EvaluateRequest {
    pub(crate) submission_id: String,
    #[validate(length(min = 1, message = "evaluations must not be empty"))]
    pub(crate) evaluations: Vec<EvaluationEntry>,
}

// Serialize is required by the derived length check on `evaluations`.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct EvaluationEntry {
    pub(crate) question_id: String,
    pub(crate) points: i32,
    #[serde(default)]
    pub(crate) feedback: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EvaluationResponse {
    pub(crate) submission_id: String,
    pub(crate) score: i32,
    pub(crate) total_points: i32,
    pub(crate) percentage_score: f64,
    pub(crate) passed: bool,
    pub(crate) status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) certificate_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) student_id: String,
    pub(crate) answers: Vec<GradedAnswer>,
    pub(crate) score: i32,
    pub(crate) total_points: i32,
    pub(crate) percentage_score: f64,
    pub(crate) time_taken_seconds: i64,
    pub(crate) tab_switch_count: i32,
    pub(crate) status: SubmissionStatus,
    pub(crate) needs_manual_evaluation: bool,
    pub(crate) submitted_at: String,
    pub(crate) evaluated_by: Option<String>,
    pub(crate) evaluated_at: Option<String>,
}

impl SubmissionResponse {
    pub(crate) fn from_db(submission: Submission) -> Self {
        Self {
            id: submission.id,
            exam_id: submission.exam_id,
            student_id: submission.student_id,
            answers: submission.answers.0,
            score: submission.score,
            total_points: submission.total_points,
            percentage_score: submission.percentage_score,
            time_taken_seconds: submission.time_taken_seconds,
            tab_switch_count: submission.tab_switch_count,
            status: submission.status,
            needs_manual_evaluation: submission.needs_manual_evaluation,
            submitted_at: format_primitive(submission.submitted_at),
            evaluated_by: submission.evaluated_by,
            evaluated_at: submission.evaluated_at.map(format_primitive),
        }
    }
}

/// Queue entry for the manual-evaluation backlog, with enough context to
/// render the grading screen without extra lookups.
#[derive(Debug, Serialize)]
pub(crate) struct PendingEvaluationResponse {
    pub(crate) submission_id: String,
    pub(crate) exam_id: String,
    pub(crate) exam_title: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) submitted_at: String,
    pub(crate) flagged_answers: Vec<GradedAnswer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_tab_switch_count_is_rejected() {
        let payload = SubmitExamRequest {
            answers: vec![RawAnswer { question_id: "q1".to_string(), answer: "A".to_string() }],
            time_taken_seconds: 10,
            tab_switch_count: -1,
        };
        assert!(payload.validate().is_err());

        let payload = SubmitExamRequest {
            answers: vec![RawAnswer { question_id: "q1".to_string(), answer: "A".to_string() }],
            time_taken_seconds: 10,
            tab_switch_count: 0,
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn empty_evaluations_are_rejected() {
        let payload =
            EvaluateRequest { submission_id: "sub-1".to_string(), evaluations: Vec::new() };
        assert!(payload.validate().is_err());

        let payload = EvaluateRequest {
            submission_id: "sub-1".to_string(),
            evaluations: vec![EvaluationEntry {
                question_id: "q1".to_string(),
                points: 3,
                feedback: None,
            }],
        };
        assert!(payload.validate().is_ok());
    }
}
