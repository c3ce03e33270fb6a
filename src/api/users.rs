use axum::{extract::State, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::user::HistoryEntryResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/me/history", get(my_history))
}

/// The caller's attempt ledger, newest first. Entries reflect the result at
/// submit time; later manual evaluations do not rewrite them.
async fn my_history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<HistoryEntryResponse>>, ApiError> {
    let entries = repositories::history::list_for_user(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load exam history"))?;

    Ok(Json(entries.into_iter().map(HistoryEntryResponse::from_db).collect()))
}
