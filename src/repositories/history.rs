use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::HistoryEntry;

const COLUMNS: &str = "\
    id, user_id, exam_id, score, passed, submitted_at, time_taken_seconds, \
    certificate_generated, certificate_url, created_at";

pub(crate) struct AppendEntry<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub exam_id: &'a str,
    pub score: i32,
    pub passed: bool,
    pub submitted_at: PrimitiveDateTime,
    pub time_taken_seconds: i64,
    pub certificate_generated: bool,
    pub certificate_url: Option<&'a str>,
}

/// Appends one ledger row per attempt. Entries are never updated afterwards;
/// the submission row stays the source of truth for evaluated scores.
pub(crate) async fn append(pool: &PgPool, params: AppendEntry<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO exam_history (
            id, user_id, exam_id, score, passed, submitted_at, time_taken_seconds,
            certificate_generated, certificate_url, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$6)",
    )
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.exam_id)
    .bind(params.score)
    .bind(params.passed)
    .bind(params.submitted_at)
    .bind(params.time_taken_seconds)
    .bind(params.certificate_generated)
    .bind(params.certificate_url)
    .execute(pool)
    .await?;

    Ok(())
}

pub(crate) async fn list_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<HistoryEntry>, sqlx::Error> {
    sqlx::query_as::<_, HistoryEntry>(&format!(
        "SELECT {COLUMNS} FROM exam_history WHERE user_id = $1 ORDER BY submitted_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}
