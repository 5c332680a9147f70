//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use uuid::Uuid;

use crate::models::{Lesson, QuizQuestion, Subscription};

/// Validate that a subscription's window and ids are sane
pub fn assert_subscription_invariants(sub: &Subscription) {
    debug_assert!(
        sub.end_date > sub.start_date,
        "Subscription {} has end date {} at or before start date {}",
        sub.id,
        sub.end_date,
        sub.start_date
    );

    debug_assert!(
        sub.user_id != Uuid::nil(),
        "Subscription {} has nil user_id",
        sub.id
    );

    debug_assert!(
        sub.package_id != Uuid::nil(),
        "Subscription {} has nil package_id",
        sub.id
    );
}

/// Validate that a lesson points at a course
pub fn assert_lesson_invariants(lesson: &Lesson) {
    debug_assert!(
        lesson.course_id != Uuid::nil(),
        "Lesson {} has nil course_id",
        lesson.id
    );

    debug_assert!(
        !lesson.title.trim().is_empty(),
        "Lesson {} has empty title",
        lesson.id
    );
}

/// Validate that a quiz question's answer key points at a real choice
pub fn assert_question_invariants(question: &QuizQuestion) {
    debug_assert!(
        !question.choices.is_empty(),
        "Question {} has no choices",
        question.id
    );

    debug_assert!(
        (question.correct_index as usize) < question.choices.len(),
        "Question {} has correct_index {} outside its {} choices",
        question.id,
        question.correct_index,
        question.choices.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_valid_subscription() {
        let sub = Subscription::purchase(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
        assert_subscription_invariants(&sub);
    }

    #[test]
    #[should_panic(expected = "end date")]
    fn test_inverted_window_panics_in_debug() {
        let now = Utc::now();
        let mut sub = Subscription::purchase(Uuid::new_v4(), Uuid::new_v4(), now);
        sub.end_date = now - chrono::Duration::days(1);
        assert_subscription_invariants(&sub);
    }

    #[test]
    fn test_valid_question() {
        let question = QuizQuestion::new(
            Uuid::new_v4(),
            "Pick one".into(),
            vec!["a".into(), "b".into()],
            1,
            0,
        );
        assert_question_invariants(&question);
    }

    #[test]
    #[should_panic(expected = "correct_index")]
    fn test_answer_key_out_of_range_panics_in_debug() {
        let question = QuizQuestion::new(Uuid::new_v4(), "Pick one".into(), vec!["a".into()], 5, 0);
        assert_question_invariants(&question);
    }
}
