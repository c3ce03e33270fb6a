use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::core::time::format_primitive;
use crate::db::models::{Exam, Submission, User};
use crate::db::types::{SubmissionStatus, UserRole};
use crate::repositories;
use crate::services::certificates::{self, CertificateData};
use crate::services::notifications::ExamResultEmail;

pub(super) async fn fetch_exam(state: &AppState, exam_id: &str) -> Result<Exam, ApiError> {
    repositories::exams::find_by_id(state.db(), exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))
}

pub(super) fn can_manage_exam(user: &User, exam: &Exam) -> bool {
    matches!(user.role, UserRole::Admin) || exam.created_by == user.id
}

/// Post-grading side effects, issued only on a Passed verdict: certificate
/// first, then the result email carrying the certificate link. Both are best
/// effort and never fail the request. Failed and Pending attempts get
/// neither.
pub(super) async fn issue_pass_artifacts(
    state: &AppState,
    student: &User,
    exam: &Exam,
    submission: &Submission,
) -> Option<String> {
    if submission.status != SubmissionStatus::Passed {
        return None;
    }

    let issued_at = format_primitive(submission.submitted_at);

    let certificate = certificates::issue(
        state.storage(),
        state.settings(),
        &student.id,
        &exam.id,
        CertificateData {
            student_name: &student.full_name,
            exam_title: &exam.title,
            score: submission.score,
            total_points: submission.total_points,
            percentage_score: submission.percentage_score,
            issued_at: &issued_at,
        },
    )
    .await;

    let certificate_url = certificate.map(|issued| issued.url);

    if let Some(notifier) = state.notifier() {
        let email = ExamResultEmail {
            to_email: &student.email,
            student_name: &student.full_name,
            exam_title: &exam.title,
            score: submission.score,
            total_points: submission.total_points,
            percentage_score: submission.percentage_score,
            status: submission.status,
            certificate_url: certificate_url.as_deref(),
        };
        if let Err(err) = notifier.send_exam_result(email).await {
            tracing::warn!(
                error = %err,
                student_id = %student.id,
                exam_id = %exam.id,
                "Result email delivery failed"
            );
        }
    }

    certificate_url
}

/// Records the attempt in the append-only ledger. A ledger write failure is
/// logged and swallowed: the submission row is the source of truth and the
/// student's result must not be lost over bookkeeping.
pub(super) async fn record_history(
    state: &AppState,
    submission: &Submission,
    certificate_url: Option<&str>,
) {
    let result = repositories::history::append(
        state.db(),
        repositories::history::AppendEntry {
            id: &Uuid::new_v4().to_string(),
            user_id: &submission.student_id,
            exam_id: &submission.exam_id,
            score: submission.score,
            passed: submission.status == SubmissionStatus::Passed,
            submitted_at: submission.submitted_at,
            time_taken_seconds: submission.time_taken_seconds,
            certificate_generated: certificate_url.is_some(),
            certificate_url,
        },
    )
    .await;

    if let Err(err) = result {
        tracing::error!(
            error = %err,
            submission_id = %submission.id,
            "Failed to append exam history entry"
        );
    }
}
