use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Question;
use crate::db::types::{DifficultyLevel, QuestionKind};

const COLUMNS: &str = "\
    id, text, kind, choices, correct_answer, points, difficulty, \
    created_by, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

/// Resolves the given ids against the current question rows, preserving the
/// requested order. Fails with `RowNotFound` when any id is missing, so a
/// stale exam question list never grades partially.
pub(crate) async fn resolve_ordered(
    pool: &PgPool,
    question_ids: &[String],
) -> Result<Vec<Question>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE id = ANY($1)"
    ))
    .bind(question_ids)
    .fetch_all(pool)
    .await?;

    let mut ordered = Vec::with_capacity(question_ids.len());
    for id in question_ids {
        let question =
            rows.iter().find(|row| &row.id == id).cloned().ok_or(sqlx::Error::RowNotFound)?;
        ordered.push(question);
    }

    Ok(ordered)
}

pub(crate) async fn sum_points(
    pool: &PgPool,
    question_ids: &[String],
) -> Result<i64, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(0);
    }

    sqlx::query_scalar("SELECT COALESCE(SUM(points), 0) FROM questions WHERE id = ANY($1)")
        .bind(question_ids)
        .fetch_one(pool)
        .await
}

pub(crate) struct CreateQuestion<'a> {
    pub id: &'a str,
    pub text: &'a str,
    pub kind: QuestionKind,
    pub choices: Vec<String>,
    pub correct_answer: &'a str,
    pub points: i32,
    pub difficulty: DifficultyLevel,
    pub created_by: &'a str,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (
            id, text, kind, choices, correct_answer, points, difficulty,
            created_by, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$9)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.text)
    .bind(params.kind)
    .bind(Json(params.choices))
    .bind(params.correct_answer)
    .bind(params.points)
    .bind(params.difficulty)
    .bind(params.created_by)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateQuestion {
    pub text: Option<String>,
    pub choices: Option<Vec<String>>,
    pub correct_answer: Option<String>,
    pub points: Option<i32>,
    pub difficulty: Option<DifficultyLevel>,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateQuestion,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "UPDATE questions SET
            text = COALESCE($1, text),
            choices = COALESCE($2, choices),
            correct_answer = COALESCE($3, correct_answer),
            points = COALESCE($4, points),
            difficulty = COALESCE($5, difficulty),
            updated_at = $6
         WHERE id = $7
         RETURNING {COLUMNS}",
    ))
    .bind(params.text)
    .bind(params.choices.map(Json))
    .bind(params.correct_answer)
    .bind(params.points)
    .bind(params.difficulty)
    .bind(params.updated_at)
    .bind(id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM questions WHERE id = $1").bind(id).execute(pool).await?;
    Ok(())
}
