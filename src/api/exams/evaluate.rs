use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::errors::ApiError;
use crate::api::exams::helpers::{can_manage_exam, fetch_exam, issue_pass_artifacts};
use crate::api::guards::{require_examiner, CurrentUser};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::db::types::SubmissionStatus;
use crate::repositories;
use crate::schemas::submission::{EvaluateRequest, EvaluationResponse, PendingEvaluationResponse};
use crate::services::evaluation::{self, ManualPoints};

/// The manual-evaluation backlog, oldest first. Admins see everything,
/// examiners only the exams they own.
pub(super) async fn list_pending_evaluations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<PendingEvaluationResponse>>, ApiError> {
    require_examiner(&user)?;

    let pending = repositories::submissions::list_pending(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list pending evaluations"))?;

    let mut responses = Vec::new();
    for submission in pending {
        let Some(exam) = repositories::exams::find_by_id(state.db(), &submission.exam_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load exam"))?
        else {
            continue;
        };

        if !can_manage_exam(&user, &exam) {
            continue;
        }

        let Some(student) = repositories::users::find_by_id(state.db(), &submission.student_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load student"))?
        else {
            continue;
        };

        let flagged_answers = submission
            .answers
            .0
            .iter()
            .filter(|answer| answer.needs_manual_evaluation)
            .cloned()
            .collect();

        responses.push(PendingEvaluationResponse {
            submission_id: submission.id,
            exam_id: exam.id,
            exam_title: exam.title,
            student_id: student.id,
            student_name: student.full_name,
            submitted_at: format_primitive(submission.submitted_at),
            flagged_answers,
        });
    }

    Ok(Json(responses))
}

/// Applies manual points to a pending submission's flagged answers and
/// finalizes its verdict.
///
/// Evaluation runs at most once per submission. A repeat call is not an
/// error: it returns the stored result untouched, so two examiners racing
/// on the same backlog entry cannot double-apply points. The history ledger
/// keeps the submit-time entry either way.
pub(super) async fn evaluate_submission(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(exam_id): Path<String>,
    Json(payload): Json<EvaluateRequest>,
) -> Result<Json<EvaluationResponse>, ApiError> {
    require_examiner(&user)?;
    validate_payload(&payload)?;

    let exam = fetch_exam(&state, &exam_id).await?;
    if !can_manage_exam(&user, &exam) {
        return Err(ApiError::Forbidden("Only the exam owner or an admin may evaluate it"));
    }

    let submission = repositories::submissions::find_by_id(state.db(), &payload.submission_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load submission"))?
        .filter(|submission| submission.exam_id == exam_id)
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;

    if !submission.needs_manual_evaluation {
        return Ok(Json(stored_response(submission)));
    }

    let evaluated_at = primitive_now_utc();
    let evaluated_at_str = format_primitive(evaluated_at);
    let entries: Vec<ManualPoints> = payload
        .evaluations
        .into_iter()
        .map(|entry| ManualPoints {
            question_id: entry.question_id,
            points: entry.points,
            feedback: entry.feedback,
        })
        .collect();

    let outcome = evaluation::apply(
        &submission.answers.0,
        &entries,
        submission.total_points,
        exam.passing_score,
        &user.id,
        &evaluated_at_str,
    );

    let was_passed = submission.status == SubmissionStatus::Passed;

    let updated = repositories::submissions::apply_evaluation(
        state.db(),
        &submission.id,
        repositories::submissions::ApplyEvaluation {
            answers: outcome.answers,
            score: outcome.score,
            percentage_score: outcome.percentage_score,
            status: outcome.status,
            evaluated_by: &user.id,
            evaluated_at,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to store evaluation"))?;

    // Lost the race to another evaluator: the row already flipped. Return
    // what is stored rather than an error.
    let Some(updated) = updated else {
        let current = repositories::submissions::find_by_id(state.db(), &submission.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to reload submission"))?
            .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;
        return Ok(Json(stored_response(current)));
    };

    let certificate_url = if !was_passed && updated.status == SubmissionStatus::Passed {
        let student = repositories::users::find_by_id(state.db(), &updated.student_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load student"))?;
        match student {
            Some(student) => issue_pass_artifacts(&state, &student, &exam, &updated).await,
            None => None,
        }
    } else {
        None
    };

    metrics::counter!(
        "manual_evaluations_total",
        "status" => updated.status.as_str()
    )
    .increment(1);

    Ok(Json(EvaluationResponse {
        submission_id: updated.id,
        score: updated.score,
        total_points: updated.total_points,
        percentage_score: updated.percentage_score,
        passed: updated.status == SubmissionStatus::Passed,
        status: updated.status,
        certificate_url,
    }))
}

fn stored_response(submission: crate::db::models::Submission) -> EvaluationResponse {
    EvaluationResponse {
        submission_id: submission.id,
        score: submission.score,
        total_points: submission.total_points,
        percentage_score: submission.percentage_score,
        passed: submission.status == SubmissionStatus::Passed,
        status: submission.status,
        certificate_url: None,
    }
}
