use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{require_examiner, CurrentUser};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Question, User};
use crate::db::types::{QuestionKind, UserRole};
use crate::repositories;
use crate::schemas::question::{CreateQuestionRequest, QuestionResponse, UpdateQuestionRequest};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_questions).post(create_question))
        .route("/:question_id", get(get_question).put(update_question).delete(delete_question))
}

async fn list_questions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    require_examiner(&user)?;

    let questions = repositories::questions::list_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;

    Ok(Json(questions.into_iter().map(QuestionResponse::from_db).collect()))
}

async fn get_question(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(question_id): Path<String>,
) -> Result<Json<QuestionResponse>, ApiError> {
    require_examiner(&user)?;

    let question = fetch_question(&state, &question_id).await?;
    Ok(Json(QuestionResponse::from_db(question)))
}

async fn create_question(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    require_examiner(&user)?;
    validate_payload(&payload)?;
    validate_question_shape(payload.kind, &payload.choices, &payload.correct_answer)?;

    let now = primitive_now_utc();
    let question = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            id: &Uuid::new_v4().to_string(),
            text: &payload.text,
            kind: payload.kind,
            choices: payload.choices,
            correct_answer: &payload.correct_answer,
            points: payload.points,
            difficulty: payload.difficulty,
            created_by: &user.id,
            created_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from_db(question))))
}

async fn update_question(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(question_id): Path<String>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<Json<QuestionResponse>, ApiError> {
    require_examiner(&user)?;
    validate_payload(&payload)?;

    let question = fetch_question(&state, &question_id).await?;
    require_owner_or_admin(&user, &question)?;

    if let Some(choices) = &payload.choices {
        let correct_answer =
            payload.correct_answer.as_deref().unwrap_or(&question.correct_answer);
        validate_question_shape(question.kind, choices, correct_answer)?;
    }

    let updated = repositories::questions::update(
        state.db(),
        &question_id,
        repositories::questions::UpdateQuestion {
            text: payload.text,
            choices: payload.choices,
            correct_answer: payload.correct_answer,
            points: payload.points,
            difficulty: payload.difficulty,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update question"))?;

    Ok(Json(QuestionResponse::from_db(updated)))
}

async fn delete_question(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(question_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_examiner(&user)?;

    let question = fetch_question(&state, &question_id).await?;
    require_owner_or_admin(&user, &question)?;

    repositories::questions::delete_by_id(state.db(), &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_question(state: &AppState, question_id: &str) -> Result<Question, ApiError> {
    repositories::questions::find_by_id(state.db(), question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load question"))?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))
}

fn require_owner_or_admin(user: &User, question: &Question) -> Result<(), ApiError> {
    if user.role == UserRole::Admin || question.created_by == user.id {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Only the question author or an admin may modify it"))
    }
}

fn validate_question_shape(
    kind: QuestionKind,
    choices: &[String],
    correct_answer: &str,
) -> Result<(), ApiError> {
    match kind {
        QuestionKind::Mcq => {
            if choices.len() < 2 {
                return Err(ApiError::BadRequest(
                    "Objective questions need at least two choices".to_string(),
                ));
            }
            if !choices.iter().any(|choice| choice == correct_answer) {
                return Err(ApiError::BadRequest(
                    "correct_answer must be one of the choices".to_string(),
                ));
            }
        }
        QuestionKind::Subjective => {
            if !choices.is_empty() {
                return Err(ApiError::BadRequest(
                    "Subjective questions must not define choices".to_string(),
                ));
            }
        }
    }
    Ok(())
}
