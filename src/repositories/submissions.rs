use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{GradedAnswer, Submission};
use crate::db::types::SubmissionStatus;

pub(crate) const COLUMNS: &str = "\
    id, exam_id, student_id, answers, score, total_points, percentage_score, \
    time_taken_seconds, tab_switch_count, status, needs_manual_evaluation, \
    submitted_at, evaluated_by, evaluated_at, created_at, updated_at";

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!("SELECT {COLUMNS} FROM submissions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn exists_for_student(
    pool: &PgPool,
    exam_id: &str,
    student_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM submissions WHERE exam_id = $1 AND student_id = $2)",
    )
    .bind(exam_id)
    .bind(student_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_by_exam(
    pool: &PgPool,
    exam_id: &str,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions WHERE exam_id = $1 ORDER BY submitted_at DESC"
    ))
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_pending(pool: &PgPool) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions
         WHERE needs_manual_evaluation = TRUE
         ORDER BY submitted_at ASC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateSubmission<'a> {
    pub id: &'a str,
    pub exam_id: &'a str,
    pub student_id: &'a str,
    pub answers: Vec<GradedAnswer>,
    pub score: i32,
    pub total_points: i32,
    pub percentage_score: f64,
    pub time_taken_seconds: i64,
    pub tab_switch_count: i32,
    pub status: SubmissionStatus,
    pub needs_manual_evaluation: bool,
    pub submitted_at: PrimitiveDateTime,
}

/// Conditionally inserts the submission. The unique constraint on
/// (exam_id, student_id) makes concurrent duplicate submits race-safe:
/// exactly one insert wins, the rest see `false`.
pub(crate) async fn create_if_absent(
    pool: &PgPool,
    params: CreateSubmission<'_>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO submissions (
            id, exam_id, student_id, answers, score, total_points, percentage_score,
            time_taken_seconds, tab_switch_count, status, needs_manual_evaluation,
            submitted_at, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$12,$12)
        ON CONFLICT (exam_id, student_id) DO NOTHING",
    )
    .bind(params.id)
    .bind(params.exam_id)
    .bind(params.student_id)
    .bind(Json(params.answers))
    .bind(params.score)
    .bind(params.total_points)
    .bind(params.percentage_score)
    .bind(params.time_taken_seconds)
    .bind(params.tab_switch_count)
    .bind(params.status)
    .bind(params.needs_manual_evaluation)
    .bind(params.submitted_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) struct ApplyEvaluation<'a> {
    pub answers: Vec<GradedAnswer>,
    pub score: i32,
    pub percentage_score: f64,
    pub status: SubmissionStatus,
    pub evaluated_by: &'a str,
    pub evaluated_at: PrimitiveDateTime,
}

/// Applies a manual evaluation. The `needs_manual_evaluation = TRUE` guard
/// makes a second pass a no-op: callers get `None` and should return the
/// stored values instead of re-grading.
pub(crate) async fn apply_evaluation(
    pool: &PgPool,
    submission_id: &str,
    params: ApplyEvaluation<'_>,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "UPDATE submissions SET
            answers = $1,
            score = $2,
            percentage_score = $3,
            status = $4,
            needs_manual_evaluation = FALSE,
            evaluated_by = $5,
            evaluated_at = $6,
            updated_at = $6
         WHERE id = $7 AND needs_manual_evaluation = TRUE
         RETURNING {COLUMNS}",
    ))
    .bind(Json(params.answers))
    .bind(params.score)
    .bind(params.percentage_score)
    .bind(params.status)
    .bind(params.evaluated_by)
    .bind(params.evaluated_at)
    .bind(submission_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn count_for_exam(pool: &PgPool, exam_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM submissions WHERE exam_id = $1")
        .bind(exam_id)
        .fetch_one(pool)
        .await
}
