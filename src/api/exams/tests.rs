// These tests run against the live test database configured in
// test_support; run them with `cargo test -- --ignored` once it is up.

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::test_support;

fn submit_payload(answers: serde_json::Value, time_taken_seconds: i64) -> serde_json::Value {
    json!({
        "answers": answers,
        "time_taken_seconds": time_taken_seconds,
        "tab_switch_count": 0
    })
}

#[tokio::test]
#[ignore]
async fn student_passes_objective_exam() {
    let ctx = test_support::setup_test_context().await;

    let examiner = test_support::insert_user(
        ctx.state.db(),
        "examiner@example.com",
        "Examiner",
        "examiner-pass",
        UserRole::Examiner,
    )
    .await;
    let student = test_support::insert_user(
        ctx.state.db(),
        "student@example.com",
        "Student",
        "student-pass",
        UserRole::Student,
    )
    .await;

    let q1 = test_support::insert_mcq(ctx.state.db(), &examiner.id, "B", 5).await;
    let q2 = test_support::insert_mcq(ctx.state.db(), &examiner.id, "A", 5).await;
    let exam = test_support::insert_exam(
        ctx.state.db(),
        &examiner.id,
        vec![q1.id.clone(), q2.id.clone()],
        10,
        60,
        30,
    )
    .await;

    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/exams/{}/submit", exam.id),
            Some(&token),
            Some(submit_payload(
                json!([
                    {"question_id": q1.id, "answer": "B"},
                    {"question_id": q2.id, "answer": "A"}
                ]),
                600,
            )),
        ))
        .await
        .expect("submit");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = test_support::read_json(response).await;
    assert_eq!(body["score"], 10);
    assert_eq!(body["total_points"], 10);
    assert_eq!(body["status"], "passed");
    assert_eq!(body["needs_manual_evaluation"], false);

    // The attempt lands in the history ledger.
    let history = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/users/me/history",
            Some(&token),
            None,
        ))
        .await
        .expect("history");
    assert_eq!(history.status(), StatusCode::OK);
    let entries = test_support::read_json(history).await;
    assert_eq!(entries.as_array().map(Vec::len), Some(1));
    assert_eq!(entries[0]["score"], 10);
    assert_eq!(entries[0]["passed"], true);
}

#[tokio::test]
#[ignore]
async fn second_submit_returns_conflict() {
    let ctx = test_support::setup_test_context().await;

    let examiner = test_support::insert_user(
        ctx.state.db(),
        "examiner@example.com",
        "Examiner",
        "examiner-pass",
        UserRole::Examiner,
    )
    .await;
    let student = test_support::insert_user(
        ctx.state.db(),
        "student@example.com",
        "Student",
        "student-pass",
        UserRole::Student,
    )
    .await;

    let q1 = test_support::insert_mcq(ctx.state.db(), &examiner.id, "B", 5).await;
    let exam =
        test_support::insert_exam(ctx.state.db(), &examiner.id, vec![q1.id.clone()], 5, 60, 30)
            .await;

    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    let payload =
        submit_payload(json!([{"question_id": q1.id, "answer": "B"}]), 100);

    let first = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/exams/{}/submit", exam.id),
            Some(&token),
            Some(payload.clone()),
        ))
        .await
        .expect("first submit");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/exams/{}/submit", exam.id),
            Some(&token),
            Some(payload),
        ))
        .await
        .expect("second submit");
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn over_time_submit_is_rejected() {
    let ctx = test_support::setup_test_context().await;

    let examiner = test_support::insert_user(
        ctx.state.db(),
        "examiner@example.com",
        "Examiner",
        "examiner-pass",
        UserRole::Examiner,
    )
    .await;
    let student = test_support::insert_user(
        ctx.state.db(),
        "student@example.com",
        "Student",
        "student-pass",
        UserRole::Student,
    )
    .await;

    let q1 = test_support::insert_mcq(ctx.state.db(), &examiner.id, "B", 5).await;
    // 30 minute exam: budget is 1800s + 30s grace.
    let exam =
        test_support::insert_exam(ctx.state.db(), &examiner.id, vec![q1.id.clone()], 5, 60, 30)
            .await;

    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/exams/{}/submit", exam.id),
            Some(&token),
            Some(submit_payload(json!([{"question_id": q1.id, "answer": "B"}]), 1831)),
        ))
        .await
        .expect("submit");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn subjective_exam_pends_then_passes_after_evaluation() {
    let ctx = test_support::setup_test_context().await;

    let examiner = test_support::insert_user(
        ctx.state.db(),
        "examiner@example.com",
        "Examiner",
        "examiner-pass",
        UserRole::Examiner,
    )
    .await;
    let student = test_support::insert_user(
        ctx.state.db(),
        "student@example.com",
        "Student",
        "student-pass",
        UserRole::Student,
    )
    .await;

    let q1 = test_support::insert_mcq(ctx.state.db(), &examiner.id, "B", 8).await;
    let q2 = test_support::insert_subjective(ctx.state.db(), &examiner.id, 2).await;
    let exam = test_support::insert_exam(
        ctx.state.db(),
        &examiner.id,
        vec![q1.id.clone(), q2.id.clone()],
        10,
        90,
        30,
    )
    .await;

    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());
    let submit = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/exams/{}/submit", exam.id),
            Some(&student_token),
            Some(submit_payload(
                json!([
                    {"question_id": q1.id, "answer": "B"},
                    {"question_id": q2.id, "answer": "a thorough essay"}
                ]),
                600,
            )),
        ))
        .await
        .expect("submit");

    assert_eq!(submit.status(), StatusCode::CREATED);
    let submitted = test_support::read_json(submit).await;
    assert_eq!(submitted["status"], "pending");
    assert_eq!(submitted["score"], 8);
    assert_eq!(submitted["needs_manual_evaluation"], true);
    let submission_id = submitted["submission_id"].as_str().expect("id").to_string();

    let examiner_token = test_support::bearer_token(&examiner.id, ctx.state.settings());

    // The backlog shows the flagged attempt.
    let pending = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/exams/evaluations/pending",
            Some(&examiner_token),
            None,
        ))
        .await
        .expect("pending");
    assert_eq!(pending.status(), StatusCode::OK);
    let backlog = test_support::read_json(pending).await;
    assert_eq!(backlog.as_array().map(Vec::len), Some(1));
    assert_eq!(backlog[0]["submission_id"], submission_id.as_str());

    let evaluate_payload = json!({
        "submission_id": submission_id,
        "evaluations": [
            {"question_id": q2.id, "points": 2, "feedback": "Well argued"}
        ]
    });

    let evaluated = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/exams/{}/evaluate", exam.id),
            Some(&examiner_token),
            Some(evaluate_payload.clone()),
        ))
        .await
        .expect("evaluate");

    assert_eq!(evaluated.status(), StatusCode::OK);
    let verdict = test_support::read_json(evaluated).await;
    assert_eq!(verdict["score"], 10);
    assert_eq!(verdict["status"], "passed");

    // A second pass is a no-op: points cannot be applied twice.
    let repeated = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/exams/{}/evaluate", exam.id),
            Some(&examiner_token),
            Some(evaluate_payload),
        ))
        .await
        .expect("repeat evaluate");

    assert_eq!(repeated.status(), StatusCode::OK);
    let unchanged = test_support::read_json(repeated).await;
    assert_eq!(unchanged["score"], 10);
    assert_eq!(unchanged["status"], "passed");

    // The ledger keeps the submit-time entry.
    let history = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/users/me/history",
            Some(&student_token),
            None,
        ))
        .await
        .expect("history");
    let entries = test_support::read_json(history).await;
    assert_eq!(entries[0]["score"], 8);
    assert_eq!(entries[0]["passed"], false);
}

#[tokio::test]
#[ignore]
async fn student_cannot_submit_unpublished_exam() {
    let ctx = test_support::setup_test_context().await;

    let examiner = test_support::insert_user(
        ctx.state.db(),
        "examiner@example.com",
        "Examiner",
        "examiner-pass",
        UserRole::Examiner,
    )
    .await;
    let student = test_support::insert_user(
        ctx.state.db(),
        "student@example.com",
        "Student",
        "student-pass",
        UserRole::Student,
    )
    .await;

    let q1 = test_support::insert_mcq(ctx.state.db(), &examiner.id, "B", 5).await;
    let exam =
        test_support::insert_exam(ctx.state.db(), &examiner.id, vec![q1.id.clone()], 5, 60, 30)
            .await;
    sqlx::query("UPDATE exams SET is_published = FALSE WHERE id = $1")
        .bind(&exam.id)
        .execute(ctx.state.db())
        .await
        .expect("unpublish");

    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/exams/{}/submit", exam.id),
            Some(&token),
            Some(submit_payload(json!([{"question_id": q1.id, "answer": "B"}]), 100)),
        ))
        .await
        .expect("submit");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn exam_with_submissions_rejects_question_changes() {
    let ctx = test_support::setup_test_context().await;

    let examiner = test_support::insert_user(
        ctx.state.db(),
        "examiner@example.com",
        "Examiner",
        "examiner-pass",
        UserRole::Examiner,
    )
    .await;
    let student = test_support::insert_user(
        ctx.state.db(),
        "student@example.com",
        "Student",
        "student-pass",
        UserRole::Student,
    )
    .await;

    let q1 = test_support::insert_mcq(ctx.state.db(), &examiner.id, "B", 5).await;
    let exam =
        test_support::insert_exam(ctx.state.db(), &examiner.id, vec![q1.id.clone()], 5, 60, 30)
            .await;

    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());
    let submit = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/exams/{}/submit", exam.id),
            Some(&student_token),
            Some(submit_payload(json!([{"question_id": q1.id, "answer": "B"}]), 100)),
        ))
        .await
        .expect("submit");
    assert_eq!(submit.status(), StatusCode::CREATED);

    let examiner_token = test_support::bearer_token(&examiner.id, ctx.state.settings());

    let frozen = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/api/v1/exams/{}", exam.id),
            Some(&examiner_token),
            Some(json!({"passing_score": 10})),
        ))
        .await
        .expect("update");
    assert_eq!(frozen.status(), StatusCode::CONFLICT);

    // Cosmetic fields stay editable.
    let renamed = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/api/v1/exams/{}", exam.id),
            Some(&examiner_token),
            Some(json!({"title": "Renamed Exam"})),
        ))
        .await
        .expect("rename");
    assert_eq!(renamed.status(), StatusCode::OK);

    let deleted = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/exams/{}", exam.id),
            Some(&examiner_token),
            None,
        ))
        .await
        .expect("delete");
    assert_eq!(deleted.status(), StatusCode::CONFLICT);
}
