//! Pure grading engine. No I/O: callers resolve the exam's questions and the
//! raw answers first, then feed both in. Grading is deterministic with
//! respect to its inputs.

use std::collections::HashMap;

use crate::db::models::{GradedAnswer, Question};
use crate::db::types::{QuestionKind, SubmissionStatus};

/// Slack added on top of the exam duration before a submission is rejected
/// as over time. Absorbs client clock skew and network latency.
pub(crate) const GRACE_PERIOD_SECONDS: i64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GradeOutcome {
    pub(crate) answers: Vec<GradedAnswer>,
    pub(crate) score: i32,
    pub(crate) total_points: i32,
    pub(crate) percentage_score: f64,
    pub(crate) status: SubmissionStatus,
    pub(crate) needs_manual_evaluation: bool,
}

pub(crate) fn within_time_budget(time_taken_seconds: i64, duration_minutes: i32) -> bool {
    time_taken_seconds <= i64::from(duration_minutes) * 60 + GRACE_PERIOD_SECONDS
}

pub(crate) fn percentage(score: i32, total_points: i32) -> f64 {
    if total_points <= 0 {
        return 0.0;
    }
    f64::from(score) / f64::from(total_points) * 100.0
}

/// Grades one attempt against the exam's questions, in question order.
///
/// Objective questions are matched by exact, case-sensitive string
/// comparison. A missing answer scores zero without an error, is never
/// flagged for review, and its question does not count toward the total:
/// only answered questions make up the denominator. Answered subjective
/// questions are flagged for manual evaluation with a provisional zero.
///
/// Any flagged answer keeps the whole attempt `Pending`: an automated pass
/// verdict is never issued while manual points are outstanding.
pub(crate) fn grade(
    questions: &[Question],
    raw_answers: &HashMap<String, String>,
    passing_score: i32,
) -> GradeOutcome {
    let mut answers = Vec::with_capacity(questions.len());
    let mut score = 0i32;
    let mut total_points = 0i32;
    let mut needs_manual_evaluation = false;

    for question in questions {
        let Some(student_answer) = raw_answers.get(&question.id).cloned() else {
            answers.push(GradedAnswer {
                question_id: question.id.clone(),
                correct: false,
                points_awarded: 0,
                max_points: question.points,
                needs_manual_evaluation: false,
                student_answer: None,
                feedback: None,
                evaluated_by: None,
                evaluated_at: None,
            });
            continue;
        };

        total_points += question.points;

        let graded = match question.kind {
            QuestionKind::Mcq => {
                let correct = student_answer == question.correct_answer;
                let points_awarded = if correct { question.points } else { 0 };
                score += points_awarded;
                GradedAnswer {
                    question_id: question.id.clone(),
                    correct,
                    points_awarded,
                    max_points: question.points,
                    needs_manual_evaluation: false,
                    student_answer: Some(student_answer),
                    feedback: None,
                    evaluated_by: None,
                    evaluated_at: None,
                }
            }
            QuestionKind::Subjective => {
                needs_manual_evaluation = true;
                GradedAnswer {
                    question_id: question.id.clone(),
                    correct: false,
                    points_awarded: 0,
                    max_points: question.points,
                    needs_manual_evaluation: true,
                    student_answer: Some(student_answer),
                    feedback: None,
                    evaluated_by: None,
                    evaluated_at: None,
                }
            }
        };

        answers.push(graded);
    }

    let percentage_score = percentage(score, total_points);
    let status = verdict(percentage_score, passing_score, needs_manual_evaluation);

    GradeOutcome { answers, score, total_points, percentage_score, status, needs_manual_evaluation }
}

pub(crate) fn verdict(
    percentage_score: f64,
    passing_score: i32,
    needs_manual_evaluation: bool,
) -> SubmissionStatus {
    if needs_manual_evaluation {
        return SubmissionStatus::Pending;
    }
    if percentage_score >= f64::from(passing_score) {
        SubmissionStatus::Passed
    } else {
        SubmissionStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;
    use crate::db::types::DifficultyLevel;
    use sqlx::types::Json;

    fn mcq(id: &str, correct_answer: &str, points: i32) -> Question {
        let now = primitive_now_utc();
        Question {
            id: id.to_string(),
            text: format!("Question {id}"),
            kind: QuestionKind::Mcq,
            choices: Json(vec!["A".to_string(), "B".to_string(), "C".to_string()]),
            correct_answer: correct_answer.to_string(),
            points,
            difficulty: DifficultyLevel::Medium,
            created_by: "examiner-1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn subjective(id: &str, points: i32) -> Question {
        let mut question = mcq(id, "", points);
        question.kind = QuestionKind::Subjective;
        question.choices = Json(Vec::new());
        question
    }

    fn answers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(id, answer)| (id.to_string(), answer.to_string())).collect()
    }

    #[test]
    fn all_objective_pass() {
        let questions = vec![mcq("q1", "B", 5), mcq("q2", "A", 5)];
        let outcome = grade(&questions, &answers(&[("q1", "B"), ("q2", "A")]), 60);

        assert_eq!(outcome.score, 10);
        assert_eq!(outcome.total_points, 10);
        assert_eq!(outcome.percentage_score, 100.0);
        assert_eq!(outcome.status, SubmissionStatus::Passed);
        assert!(!outcome.needs_manual_evaluation);
    }

    #[test]
    fn all_objective_fail() {
        let questions = vec![mcq("q1", "B", 5), mcq("q2", "A", 5)];
        let outcome = grade(&questions, &answers(&[("q1", "C"), ("q2", "A")]), 60);

        assert_eq!(outcome.score, 5);
        assert_eq!(outcome.percentage_score, 50.0);
        assert_eq!(outcome.status, SubmissionStatus::Failed);
    }

    #[test]
    fn subjective_question_forces_pending_even_above_threshold() {
        let questions = vec![mcq("q1", "B", 8), subjective("q2", 2)];
        let outcome = grade(&questions, &answers(&[("q1", "B"), ("q2", "long essay")]), 50);

        // 8/10 = 80% is above the threshold, but the flagged answer keeps
        // the verdict provisional.
        assert_eq!(outcome.score, 8);
        assert_eq!(outcome.total_points, 10);
        assert_eq!(outcome.status, SubmissionStatus::Pending);
        assert!(outcome.needs_manual_evaluation);
        assert!(outcome.answers[1].needs_manual_evaluation);
        assert_eq!(outcome.answers[1].points_awarded, 0);
        assert_eq!(outcome.answers[1].student_answer.as_deref(), Some("long essay"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let questions = vec![mcq("q1", "Paris", 5)];
        let outcome = grade(&questions, &answers(&[("q1", "paris")]), 50);

        assert_eq!(outcome.score, 0);
        assert!(!outcome.answers[0].correct);
    }

    #[test]
    fn missing_answer_scores_zero_silently() {
        let questions = vec![mcq("q1", "B", 5), mcq("q2", "A", 5)];
        let outcome = grade(&questions, &answers(&[("q1", "B")]), 40);

        // The skipped question stays out of the denominator.
        assert_eq!(outcome.score, 5);
        assert_eq!(outcome.total_points, 5);
        assert_eq!(outcome.percentage_score, 100.0);
        assert_eq!(outcome.answers[1].student_answer, None);
        assert!(!outcome.answers[1].correct);
        assert_eq!(outcome.answers[1].points_awarded, 0);
        assert_eq!(outcome.status, SubmissionStatus::Passed);
    }

    #[test]
    fn unanswered_subjective_is_not_flagged_for_review() {
        let questions = vec![subjective("q1", 5)];
        let outcome = grade(&questions, &HashMap::new(), 40);

        assert!(!outcome.needs_manual_evaluation);
        assert!(!outcome.answers[0].needs_manual_evaluation);
        assert_eq!(outcome.answers[0].points_awarded, 0);
        assert_eq!(outcome.status, SubmissionStatus::Failed);
    }

    #[test]
    fn skipped_subjective_does_not_block_an_automated_pass() {
        let questions = vec![mcq("q1", "B", 5), subjective("q2", 5)];
        let outcome = grade(&questions, &answers(&[("q1", "B")]), 60);

        assert_eq!(outcome.score, 5);
        assert_eq!(outcome.total_points, 5);
        assert!(!outcome.needs_manual_evaluation);
        assert_eq!(outcome.status, SubmissionStatus::Passed);
    }

    #[test]
    fn unanswered_attempt_scores_zero() {
        let questions = vec![mcq("q1", "B", 5), mcq("q2", "A", 5)];
        let outcome = grade(&questions, &HashMap::new(), 40);

        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.total_points, 0);
        assert_eq!(outcome.percentage_score, 0.0);
        assert_eq!(outcome.status, SubmissionStatus::Failed);
    }

    #[test]
    fn empty_exam_yields_zero_percentage() {
        let outcome = grade(&[], &HashMap::new(), 50);

        assert_eq!(outcome.total_points, 0);
        assert_eq!(outcome.percentage_score, 0.0);
        assert_eq!(outcome.status, SubmissionStatus::Failed);
    }

    #[test]
    fn exact_threshold_passes() {
        let questions = vec![mcq("q1", "B", 5), mcq("q2", "A", 5)];
        let outcome = grade(&questions, &answers(&[("q1", "B"), ("q2", "C")]), 50);

        assert_eq!(outcome.percentage_score, 50.0);
        assert_eq!(outcome.status, SubmissionStatus::Passed);
    }

    #[test]
    fn time_budget_includes_grace_period() {
        // 60 minute exam: 3600s budget + 30s grace.
        assert!(within_time_budget(3600, 60));
        assert!(within_time_budget(3630, 60));
        assert!(!within_time_budget(3631, 60));
    }
}
