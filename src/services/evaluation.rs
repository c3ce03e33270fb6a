//! Pure manual-evaluation logic: applies examiner points to the graded
//! answers of a pending submission and recomputes the verdict against the
//! submission's own total-points snapshot.

use crate::db::models::GradedAnswer;
use crate::db::types::SubmissionStatus;
use crate::services::grading;

#[derive(Debug, Clone)]
pub(crate) struct ManualPoints {
    pub(crate) question_id: String,
    pub(crate) points: i32,
    pub(crate) feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EvaluationOutcome {
    pub(crate) answers: Vec<GradedAnswer>,
    pub(crate) score: i32,
    pub(crate) percentage_score: f64,
    pub(crate) status: SubmissionStatus,
}

/// Applies manual points to the flagged answers of a submission.
///
/// Points are clamped into `[0, max_points]` per answer. Entries naming a
/// question that is not flagged for manual evaluation, or not present in
/// the submission at all, are skipped without error. The new verdict is
/// computed against `total_points` as snapshotted at submit time, not the
/// current question bank.
///
/// Evaluation is a single pass: the verdict is finalized to Passed or
/// Failed even when the entries do not cover every flagged answer. Answers
/// left unevaluated keep their provisional zero.
pub(crate) fn apply(
    answers: &[GradedAnswer],
    evaluations: &[ManualPoints],
    total_points: i32,
    passing_score: i32,
    evaluated_by: &str,
    evaluated_at: &str,
) -> EvaluationOutcome {
    let mut updated: Vec<GradedAnswer> = answers.to_vec();

    for entry in evaluations {
        let Some(answer) = updated
            .iter_mut()
            .find(|answer| answer.question_id == entry.question_id && answer.needs_manual_evaluation)
        else {
            continue;
        };

        let awarded = entry.points.clamp(0, answer.max_points);
        answer.points_awarded = awarded;
        answer.correct = awarded == answer.max_points;
        answer.needs_manual_evaluation = false;
        answer.feedback = entry.feedback.clone();
        answer.evaluated_by = Some(evaluated_by.to_string());
        answer.evaluated_at = Some(evaluated_at.to_string());
    }

    let score: i32 = updated.iter().map(|answer| answer.points_awarded).sum();
    let percentage_score = grading::percentage(score, total_points);
    let status = grading::verdict(percentage_score, passing_score, false);

    EvaluationOutcome { answers: updated, score, percentage_score, status }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graded(id: &str, points_awarded: i32, max_points: i32, manual: bool) -> GradedAnswer {
        GradedAnswer {
            question_id: id.to_string(),
            correct: !manual && points_awarded == max_points,
            points_awarded,
            max_points,
            needs_manual_evaluation: manual,
            student_answer: Some("answer".to_string()),
            feedback: None,
            evaluated_by: None,
            evaluated_at: None,
        }
    }

    fn points(id: &str, points: i32) -> ManualPoints {
        ManualPoints { question_id: id.to_string(), points, feedback: None }
    }

    #[test]
    fn pending_submission_passes_after_manual_points() {
        let answers = vec![graded("q1", 8, 8, false), graded("q2", 0, 2, true)];
        let outcome = apply(&answers, &[points("q2", 2)], 10, 90, "examiner-1", "2026-08-23T10:00:00Z");

        assert_eq!(outcome.score, 10);
        assert_eq!(outcome.percentage_score, 100.0);
        assert_eq!(outcome.status, SubmissionStatus::Passed);
        assert!(!outcome.answers[1].needs_manual_evaluation);
        assert!(outcome.answers[1].correct);
        assert_eq!(outcome.answers[1].evaluated_by.as_deref(), Some("examiner-1"));
    }

    #[test]
    fn points_above_max_are_clamped() {
        let answers = vec![graded("q1", 0, 5, true)];
        let outcome = apply(&answers, &[points("q1", 50)], 5, 50, "examiner-1", "now");

        assert_eq!(outcome.answers[0].points_awarded, 5);
        assert_eq!(outcome.score, 5);
    }

    #[test]
    fn negative_points_are_clamped_to_zero() {
        let answers = vec![graded("q1", 0, 5, true)];
        let outcome = apply(&answers, &[points("q1", -3)], 5, 50, "examiner-1", "now");

        assert_eq!(outcome.answers[0].points_awarded, 0);
        assert!(!outcome.answers[0].correct);
    }

    #[test]
    fn entries_for_unflagged_answers_are_skipped() {
        let answers = vec![graded("q1", 8, 8, false), graded("q2", 0, 2, true)];
        let outcome = apply(
            &answers,
            &[points("q1", 0), points("unknown", 2), points("q2", 1)],
            10,
            50,
            "examiner-1",
            "now",
        );

        // The objective answer keeps its automated score.
        assert_eq!(outcome.answers[0].points_awarded, 8);
        assert!(outcome.answers[0].evaluated_by.is_none());
        assert_eq!(outcome.answers[1].points_awarded, 1);
        assert_eq!(outcome.score, 9);
    }

    #[test]
    fn partial_evaluation_still_finalizes_the_verdict() {
        // Only one of two flagged answers is covered; the other keeps its
        // provisional zero and the verdict is final, never Pending again.
        let answers = vec![graded("q1", 0, 5, true), graded("q2", 0, 5, true)];
        let outcome = apply(&answers, &[points("q1", 5)], 10, 40, "examiner-1", "now");

        assert_eq!(outcome.score, 5);
        assert_eq!(outcome.percentage_score, 50.0);
        assert_eq!(outcome.status, SubmissionStatus::Passed);
        assert_eq!(outcome.answers[1].points_awarded, 0);
    }

    #[test]
    fn verdict_uses_total_points_snapshot() {
        // Snapshot total is 20 even though the answers only cover 10 points
        // of it; the percentage must use the snapshot.
        let answers = vec![graded("q1", 8, 8, false), graded("q2", 0, 2, true)];
        let outcome = apply(&answers, &[points("q2", 2)], 20, 50, "examiner-1", "now");

        assert_eq!(outcome.score, 10);
        assert_eq!(outcome.percentage_score, 50.0);
        assert_eq!(outcome.status, SubmissionStatus::Passed);
    }

    #[test]
    fn partial_credit_below_threshold_fails() {
        let answers = vec![graded("q1", 4, 8, false), graded("q2", 0, 2, true)];
        let outcome = apply(&answers, &[points("q2", 1)], 10, 60, "examiner-1", "now");

        assert_eq!(outcome.score, 5);
        assert_eq!(outcome.percentage_score, 50.0);
        assert_eq!(outcome.status, SubmissionStatus::Failed);
    }
}
