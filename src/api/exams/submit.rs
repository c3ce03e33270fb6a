use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::exams::helpers::{fetch_exam, issue_pass_artifacts, record_history};
use crate::api::guards::CurrentUser;
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::{SubmissionStatus, UserRole};
use crate::repositories;
use crate::schemas::submission::{SubmitExamRequest, SubmitExamResponse};
use crate::services::grading;

/// Grades and records one exam attempt.
///
/// Preconditions are checked in a fixed order so clients see stable error
/// codes: payload shape, exam existence, duplicate attempt, time budget.
/// The insert itself is conditional on (exam_id, student_id), so two
/// concurrent submits cannot both be recorded.
pub(super) async fn submit_exam(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(exam_id): Path<String>,
    Json(payload): Json<SubmitExamRequest>,
) -> Result<(StatusCode, Json<SubmitExamResponse>), ApiError> {
    validate_payload(&payload)?;
    if payload.answers.is_empty() {
        return Err(ApiError::BadRequest("answers must not be empty".to_string()));
    }
    if user.role != UserRole::Student {
        return Err(ApiError::Forbidden("Only students may submit exams"));
    }

    let exam = fetch_exam(&state, &exam_id).await?;
    if !exam.is_published {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }

    let already = repositories::submissions::exists_for_student(state.db(), &exam_id, &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing submission"))?;
    if already {
        return Err(ApiError::Conflict("Exam already submitted".to_string()));
    }

    if !grading::within_time_budget(payload.time_taken_seconds, exam.duration_minutes) {
        return Err(ApiError::BadRequest("Time limit exceeded".to_string()));
    }

    // Questions are resolved live at grading time; the exam's id list is the
    // source of truth for order and membership.
    let questions = repositories::questions::resolve_ordered(state.db(), &exam.question_ids.0)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ApiError::internal(
                "exam references missing questions",
                "Exam question list is stale",
            ),
            other => ApiError::internal(other, "Failed to resolve exam questions"),
        })?;

    let raw_answers: HashMap<String, String> = payload
        .answers
        .into_iter()
        .map(|answer| (answer.question_id, answer.answer))
        .collect();

    let outcome = grading::grade(&questions, &raw_answers, exam.passing_score);
    let submitted_at = primitive_now_utc();
    let submission_id = Uuid::new_v4().to_string();

    let inserted = repositories::submissions::create_if_absent(
        state.db(),
        repositories::submissions::CreateSubmission {
            id: &submission_id,
            exam_id: &exam_id,
            student_id: &user.id,
            answers: outcome.answers.clone(),
            score: outcome.score,
            total_points: outcome.total_points,
            percentage_score: outcome.percentage_score,
            time_taken_seconds: payload.time_taken_seconds,
            tab_switch_count: payload.tab_switch_count,
            status: outcome.status,
            needs_manual_evaluation: outcome.needs_manual_evaluation,
            submitted_at,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to record submission"))?;

    if !inserted {
        // Lost the race against a concurrent submit of the same attempt.
        return Err(ApiError::Conflict("Exam already submitted".to_string()));
    }

    let submission = repositories::submissions::find_by_id(state.db(), &submission_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load submission"))?
        .ok_or_else(|| ApiError::Internal("Submission vanished after insert".to_string()))?;

    let certificate_url = issue_pass_artifacts(&state, &user, &exam, &submission).await;
    record_history(&state, &submission, certificate_url.as_deref()).await;

    metrics::counter!(
        "exam_submissions_total",
        "status" => outcome.status.as_str()
    )
    .increment(1);

    Ok((
        StatusCode::CREATED,
        Json(SubmitExamResponse {
            submission_id,
            score: outcome.score,
            total_points: outcome.total_points,
            percentage_score: outcome.percentage_score,
            passed: outcome.status == SubmissionStatus::Passed,
            status: outcome.status,
            needs_manual_evaluation: outcome.needs_manual_evaluation,
            certificate_url,
        }),
    ))
}
