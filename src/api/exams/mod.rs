mod evaluate;
mod helpers;
mod manage;
mod submit;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(manage::create_exam).get(manage::list_exams))
        .route("/evaluations/pending", get(evaluate::list_pending_evaluations))
        .route(
            "/:exam_id",
            get(manage::get_exam).put(manage::update_exam).delete(manage::delete_exam),
        )
        .route("/:exam_id/submit", post(submit::submit_exam))
        .route("/:exam_id/evaluate", post(evaluate::evaluate_submission))
        .route("/:exam_id/submissions", get(manage::list_exam_submissions))
}

#[cfg(test)]
mod tests;
