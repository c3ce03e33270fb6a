use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::exams::helpers::{can_manage_exam, fetch_exam};
use crate::api::guards::{require_examiner, CurrentUser};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::exam::{
    CreateExamRequest, ExamDetailResponse, ExamResponse, UpdateExamRequest,
};
use crate::schemas::question::QuestionResponse;
use crate::schemas::submission::SubmissionResponse;

pub(super) async fn create_exam(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateExamRequest>,
) -> Result<(StatusCode, Json<ExamResponse>), ApiError> {
    require_examiner(&user)?;
    validate_payload(&payload)?;

    // All-or-nothing resolution: a dangling question id fails the create.
    let questions = repositories::questions::resolve_ordered(state.db(), &payload.question_ids)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                ApiError::BadRequest("One or more question ids do not exist".to_string())
            }
            other => ApiError::internal(other, "Failed to resolve questions"),
        })?;

    let total_points: i32 = questions.iter().map(|question| question.points).sum();

    let exam = repositories::exams::create(
        state.db(),
        repositories::exams::CreateExam {
            id: &Uuid::new_v4().to_string(),
            title: &payload.title,
            description: &payload.description,
            duration_minutes: payload.duration_minutes,
            passing_score: payload.passing_score,
            total_points,
            question_ids: payload.question_ids,
            is_published: payload.is_published,
            created_by: &user.id,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create exam"))?;

    Ok((StatusCode::CREATED, Json(ExamResponse::from_db(exam))))
}

pub(super) async fn list_exams(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<ExamResponse>>, ApiError> {
    let exams = repositories::exams::list_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;

    let visible = exams
        .into_iter()
        .filter(|exam| user.role != UserRole::Student || exam.is_published)
        .map(ExamResponse::from_db)
        .collect();

    Ok(Json(visible))
}

pub(super) async fn get_exam(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(exam_id): Path<String>,
) -> Result<Json<ExamDetailResponse>, ApiError> {
    let exam = fetch_exam(&state, &exam_id).await?;

    if user.role == UserRole::Student && !exam.is_published {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }

    let questions = repositories::questions::resolve_ordered(state.db(), &exam.question_ids.0)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve exam questions"))?;

    let questions = questions
        .into_iter()
        .map(|question| {
            if user.role == UserRole::Student {
                QuestionResponse::from_db_redacted(question)
            } else {
                QuestionResponse::from_db(question)
            }
        })
        .collect();

    Ok(Json(ExamDetailResponse { exam: ExamResponse::from_db(exam), questions }))
}

pub(super) async fn update_exam(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(exam_id): Path<String>,
    Json(payload): Json<UpdateExamRequest>,
) -> Result<Json<ExamResponse>, ApiError> {
    require_examiner(&user)?;
    validate_payload(&payload)?;

    let exam = fetch_exam(&state, &exam_id).await?;
    if !can_manage_exam(&user, &exam) {
        return Err(ApiError::Forbidden("Only the exam owner or an admin may modify it"));
    }

    let submission_count = repositories::submissions::count_for_exam(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count submissions"))?;

    // Grading-relevant fields are frozen once attempts exist; existing
    // submissions keep their snapshots either way, but accepting the edit
    // would misrepresent what those attempts were graded against.
    if submission_count > 0 && payload.touches_grading_fields() {
        return Err(ApiError::Conflict(
            "Cannot change questions, duration or passing score after submissions exist"
                .to_string(),
        ));
    }

    let total_points = match &payload.question_ids {
        Some(question_ids) => {
            repositories::questions::resolve_ordered(state.db(), question_ids).await.map_err(
                |e| match e {
                    sqlx::Error::RowNotFound => {
                        ApiError::BadRequest("One or more question ids do not exist".to_string())
                    }
                    other => ApiError::internal(other, "Failed to resolve questions"),
                },
            )?;
            let sum = repositories::questions::sum_points(state.db(), question_ids)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to sum question points"))?;
            Some(sum as i32)
        }
        None => None,
    };

    let updated = repositories::exams::update(
        state.db(),
        &exam_id,
        repositories::exams::UpdateExam {
            title: payload.title,
            description: payload.description,
            duration_minutes: payload.duration_minutes,
            passing_score: payload.passing_score,
            question_ids: payload.question_ids,
            total_points,
            is_published: payload.is_published,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update exam"))?;

    Ok(Json(ExamResponse::from_db(updated)))
}

pub(super) async fn delete_exam(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(exam_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_examiner(&user)?;

    let exam = fetch_exam(&state, &exam_id).await?;
    if !can_manage_exam(&user, &exam) {
        return Err(ApiError::Forbidden("Only the exam owner or an admin may modify it"));
    }

    let submission_count = repositories::submissions::count_for_exam(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count submissions"))?;

    if submission_count > 0 {
        return Err(ApiError::Conflict(
            "Cannot delete an exam that already has submissions".to_string(),
        ));
    }

    repositories::exams::delete_by_id(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete exam"))?;

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn list_exam_submissions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(exam_id): Path<String>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    require_examiner(&user)?;

    let exam = fetch_exam(&state, &exam_id).await?;
    if !can_manage_exam(&user, &exam) {
        return Err(ApiError::Forbidden("Only the exam owner or an admin may view submissions"));
    }

    let submissions = repositories::submissions::list_by_exam(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;

    Ok(Json(submissions.into_iter().map(SubmissionResponse::from_db).collect()))
}
