//! Score computation for assessment attempts, plus the rounding helper
//! shared with lesson-progress percentages.

use std::collections::BTreeMap;

use crate::model::{Assessment, AssessmentId};

//
// ─── SHARED ROUNDING ───────────────────────────────────────────────────────────
//

/// Integer percentage of `part` in `whole`, rounded half up and clamped to
/// 100. A zero `whole` yields 0 rather than dividing by zero.
///
/// Assessment scores and lesson progress both go through this function so the
/// two surfaces can never disagree on how a percentage rounds.
#[must_use]
pub fn percent_of(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let pct = ((200 * part + whole) / (2 * whole)).min(100);
    u8::try_from(pct).unwrap_or(100)
}

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

/// The outcome derived from an attempt: a rounded score and its
/// classification against the assessment's pass threshold.
///
/// Produced once, when the learner advances past the final question. Never
/// persisted; a passed pre-test only lives as long as the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssessmentResult {
    assessment_id: AssessmentId,
    score: u8,
    correct: usize,
    total: usize,
    passed: bool,
}

impl AssessmentResult {
    #[must_use]
    pub fn assessment_id(&self) -> AssessmentId {
        self.assessment_id
    }

    /// Percentage score, 0–100.
    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Scores an answer map against an assessment.
///
/// `answers` maps question position to selected option index and may be
/// sparse: a position with no entry counts as incorrect. Back-navigation can
/// leave earlier questions unanswered when the learner skips forward again;
/// the score simply reflects whatever was answered at completion time.
#[must_use]
pub fn score_attempt(
    assessment: &Assessment,
    answers: &BTreeMap<usize, usize>,
) -> AssessmentResult {
    let total = assessment.question_count();
    let correct = assessment
        .questions()
        .iter()
        .enumerate()
        .filter(|(position, question)| {
            answers
                .get(position)
                .is_some_and(|&selected| question.is_correct(selected))
        })
        .count();
    let score = percent_of(correct, total);

    AssessmentResult {
        assessment_id: assessment.id(),
        score,
        correct,
        total,
        passed: score >= assessment.pass_threshold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LocalizedText;
    use crate::model::{AssessmentId, Attachment, LessonId, Question, QuestionId};

    fn build_assessment(correct_options: &[usize], threshold: u8) -> Assessment {
        let questions = correct_options
            .iter()
            .enumerate()
            .map(|(i, &correct)| {
                Question::new(
                    QuestionId::from_u128(i as u128 + 1),
                    LocalizedText::plain(format!("Q{i}")),
                    vec![
                        LocalizedText::plain("a"),
                        LocalizedText::plain("b"),
                        LocalizedText::plain("c"),
                    ],
                    correct,
                )
                .unwrap()
            })
            .collect();
        Assessment::with_threshold(
            AssessmentId::from_u128(1),
            Attachment::Lesson(LessonId::from_u128(1)),
            questions,
            threshold,
        )
        .unwrap()
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent_of(3, 4), 75);
        assert_eq!(percent_of(1, 8), 13);
        assert_eq!(percent_of(2, 3), 67);
        assert_eq!(percent_of(1, 3), 33);
    }

    #[test]
    fn percent_of_zero_whole_is_zero() {
        assert_eq!(percent_of(0, 0), 0);
        assert_eq!(percent_of(5, 0), 0);
    }

    #[test]
    fn full_answer_map_scores_expected_percentage() {
        let assessment = build_assessment(&[1, 0, 2], 80);
        let mut answers = BTreeMap::new();
        answers.insert(0, 1);
        answers.insert(1, 2);
        answers.insert(2, 2);

        let result = score_attempt(&assessment, &answers);
        assert_eq!(result.correct(), 2);
        assert_eq!(result.total(), 3);
        assert_eq!(result.score(), 67);
        assert!(!result.passed());
    }

    #[test]
    fn single_question_all_correct_passes() {
        let assessment = build_assessment(&[1], 80);
        let mut answers = BTreeMap::new();
        answers.insert(0, 1);

        let result = score_attempt(&assessment, &answers);
        assert_eq!(result.score(), 100);
        assert!(result.passed());
    }

    #[test]
    fn single_question_wrong_answer_fails() {
        let assessment = build_assessment(&[1], 80);
        let mut answers = BTreeMap::new();
        answers.insert(0, 0);

        let result = score_attempt(&assessment, &answers);
        assert_eq!(result.score(), 0);
        assert!(!result.passed());
    }

    #[test]
    fn unanswered_questions_count_as_incorrect() {
        let assessment = build_assessment(&[0, 0], 50);
        let mut answers = BTreeMap::new();
        answers.insert(1, 0);

        let result = score_attempt(&assessment, &answers);
        assert_eq!(result.correct(), 1);
        assert_eq!(result.score(), 50);
        assert!(result.passed());
    }

    #[test]
    fn passed_tracks_threshold_at_every_boundary() {
        for threshold in 0..=100_u8 {
            let assessment = build_assessment(&[0, 0, 0, 0], threshold);
            let mut answers = BTreeMap::new();
            answers.insert(0, 0);
            answers.insert(1, 0);
            answers.insert(2, 0);
            answers.insert(3, 1);

            let result = score_attempt(&assessment, &answers);
            assert_eq!(result.score(), 75);
            assert_eq!(result.passed(), 75 >= threshold);
        }
    }

    #[test]
    fn zero_threshold_passes_even_an_empty_answer_map() {
        let assessment = build_assessment(&[0], 0);
        let result = score_attempt(&assessment, &BTreeMap::new());
        assert_eq!(result.score(), 0);
        assert!(result.passed());
    }
}
