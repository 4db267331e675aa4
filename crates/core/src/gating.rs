//! Pure gating decisions: which content a learner may enter, which lessons
//! they may finish, and how far along they are.
//!
//! Every function here is total. Missing data — no completion records yet, no
//! quiz result yet — reads as "not completed" / "not passed", never as an
//! error. Callers re-derive decisions from current state on every render;
//! nothing in this module caches.
//!
//! The `privileged` flag is the single administrative override. It is threaded
//! through every check explicitly rather than re-derived at call sites, so the
//! bypass stays auditable.

use crate::model::{CompletionRecord, Course, Lesson, LessonId};
use crate::scoring::{AssessmentResult, percent_of};

/// Returns true when `records` carries a completed entry for `lesson_id`.
#[must_use]
pub fn is_completed(records: &[CompletionRecord], lesson_id: LessonId) -> bool {
    records
        .iter()
        .any(|r| r.lesson_id() == lesson_id && r.is_completed())
}

/// Whether a learner may enter a lesson.
///
/// Unlocked when any of: the lesson carries no quiz, the learner already
/// completed it, the latest in-session result for the lesson's quiz passed,
/// or the caller is privileged.
///
/// `latest_result` must be the result for this lesson's quiz; the caller owns
/// that association.
#[must_use]
pub fn is_lesson_unlocked(
    lesson: &Lesson,
    records: &[CompletionRecord],
    latest_result: Option<&AssessmentResult>,
    privileged: bool,
) -> bool {
    !lesson.has_quiz()
        || is_completed(records, lesson.id())
        || latest_result.is_some_and(AssessmentResult::passed)
        || privileged
}

/// Whether the "finish lesson" action is allowed.
///
/// Mirrors [`is_lesson_unlocked`] with the completion check supplied by the
/// caller, because the finish flow already knows whether the lesson is done.
/// Services must re-check this against fresh state immediately before
/// committing the completion upsert; the UI state it was rendered from may be
/// stale.
#[must_use]
pub fn can_finish_lesson(
    lesson: &Lesson,
    already_completed: bool,
    latest_result: Option<&AssessmentResult>,
    privileged: bool,
) -> bool {
    already_completed
        || !lesson.has_quiz()
        || latest_result.is_some_and(AssessmentResult::passed)
        || privileged
}

/// Whether a learner may enter a course.
///
/// Mirrors the lesson rule at course granularity: unlocked when the course
/// has no pre-test, the pre-test was passed this session, or the caller is
/// privileged.
#[must_use]
pub fn is_course_unlocked(course: &Course, passed_pre_test: bool, privileged: bool) -> bool {
    !course.has_pre_test() || passed_pre_test || privileged
}

/// Completion percentage with the same rounding as assessment scores.
/// `0 / 0` is 0, not an error.
#[must_use]
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    percent_of(completed, total)
}

/// Whether every lesson reachable through the course's modules is completed.
///
/// A course with zero lessons is never considered complete; the vacuous truth
/// would inflate completed-course counts.
#[must_use]
pub fn is_course_completed(course: &Course, records: &[CompletionRecord]) -> bool {
    let lesson_ids = course.lesson_ids();
    !lesson_ids.is_empty() && lesson_ids.iter().all(|&id| is_completed(records, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LocalizedText;
    use crate::model::{
        Assessment, AssessmentId, Attachment, CourseId, LearnerId, LessonId, Module, ModuleId,
        Question, QuestionId,
    };
    use crate::scoring::score_attempt;
    use crate::time::fixed_now;
    use std::collections::BTreeMap;

    fn build_quiz(attachment: Attachment) -> Assessment {
        let question = Question::new(
            QuestionId::from_u128(1),
            LocalizedText::plain("Q"),
            vec![LocalizedText::plain("a"), LocalizedText::plain("b")],
            1,
        )
        .unwrap();
        Assessment::new(AssessmentId::from_u128(1), attachment, vec![question]).unwrap()
    }

    fn build_lesson(id: u128) -> Lesson {
        Lesson::new(
            LessonId::from_u128(id),
            LocalizedText::plain("L"),
            LocalizedText::plain("body"),
            0,
        )
    }

    fn build_lesson_with_quiz(id: u128) -> Lesson {
        let lesson = build_lesson(id);
        let quiz = build_quiz(Attachment::Lesson(lesson.id()));
        lesson.with_quiz(quiz).unwrap()
    }

    fn build_course(lesson_ids: &[u128]) -> Course {
        let lessons = lesson_ids.iter().map(|&id| build_lesson(id)).collect();
        let module =
            Module::new(ModuleId::from_u128(1), LocalizedText::plain("M"), 0).with_lessons(lessons);
        Course::new(
            CourseId::from_u128(1),
            LocalizedText::plain("C"),
            fixed_now(),
        )
        .with_modules(vec![module])
    }

    fn completed(lesson: u128) -> CompletionRecord {
        CompletionRecord::completed_now(
            LearnerId::from_u128(1),
            LessonId::from_u128(lesson),
            fixed_now(),
        )
    }

    fn result_for(quiz: &Assessment, selected: usize) -> AssessmentResult {
        let mut answers = BTreeMap::new();
        answers.insert(0, selected);
        score_attempt(quiz, &answers)
    }

    #[test]
    fn lesson_without_quiz_is_immediately_unlocked() {
        let lesson = build_lesson(1);
        assert!(is_lesson_unlocked(&lesson, &[], None, false));
    }

    #[test]
    fn quiz_lesson_stays_locked_until_passed_or_completed() {
        let lesson = build_lesson_with_quiz(1);
        assert!(!is_lesson_unlocked(&lesson, &[], None, false));

        let passed = result_for(lesson.quiz().unwrap(), 1);
        assert!(is_lesson_unlocked(&lesson, &[], Some(&passed), false));

        let failed = result_for(lesson.quiz().unwrap(), 0);
        assert!(!is_lesson_unlocked(&lesson, &[], Some(&failed), false));

        let records = vec![completed(1)];
        assert!(is_lesson_unlocked(&lesson, &records, None, false));
    }

    #[test]
    fn privileged_override_dominates_every_other_input() {
        let lesson = build_lesson_with_quiz(1);
        let failed = result_for(lesson.quiz().unwrap(), 0);
        assert!(is_lesson_unlocked(&lesson, &[], Some(&failed), true));
        assert!(is_lesson_unlocked(&lesson, &[], None, true));
        assert!(can_finish_lesson(&lesson, false, None, true));
    }

    #[test]
    fn failed_quiz_blocks_finishing_the_lesson() {
        let lesson = build_lesson_with_quiz(1);
        let failed = result_for(lesson.quiz().unwrap(), 0);
        assert!(!can_finish_lesson(&lesson, false, Some(&failed), false));
        // Already-completed lessons may always be "finished" again (no-op).
        assert!(can_finish_lesson(&lesson, true, Some(&failed), false));
    }

    #[test]
    fn course_pre_test_gates_entry() {
        let course = build_course(&[1]);
        assert!(is_course_unlocked(&course, false, false));

        let gated = build_course(&[1])
            .with_pre_test(build_quiz(Attachment::PreTest(CourseId::from_u128(1))))
            .unwrap();
        assert!(!is_course_unlocked(&gated, false, false));
        assert!(is_course_unlocked(&gated, true, false));
        assert!(is_course_unlocked(&gated, false, true));
    }

    #[test]
    fn progress_percent_matches_scoring_rounding() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(3, 4), 75);
        assert_eq!(progress_percent(2, 3), 67);
    }

    #[test]
    fn course_completion_requires_every_lesson() {
        let course = build_course(&[1, 2]);
        let both = vec![completed(1), completed(2)];
        assert!(is_course_completed(&course, &both));

        let one = vec![completed(1)];
        assert!(!is_course_completed(&course, &one));
    }

    #[test]
    fn empty_course_is_never_complete() {
        let course = build_course(&[]);
        assert!(!is_course_completed(&course, &[]));
    }

    #[test]
    fn incomplete_record_does_not_count() {
        let course = build_course(&[1]);
        let records = vec![CompletionRecord::from_persisted(
            LearnerId::from_u128(1),
            LessonId::from_u128(1),
            false,
            None,
        )];
        assert!(!is_course_completed(&course, &records));
    }
}
