use std::collections::BTreeMap;

use academy_core::model::{Assessment, Question};
use academy_core::scoring::{self, AssessmentResult};

use super::view::{AttemptProgress, QuestionReview};

//
// ─── ADVANCE OUTCOME ───────────────────────────────────────────────────────────
//

/// Outcome of an [`Attempt::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Nothing moved: the current question has no recorded answer, or the
    /// attempt is already complete.
    Ignored,
    /// Moved forward one question.
    Moved,
    /// Advanced past the final question: the attempt is complete and this is
    /// its result.
    Completed(AssessmentResult),
}

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// One in-progress or completed traversal of an assessment.
///
/// Ephemeral by design: dropping the attempt discards all partial state, and
/// nothing here touches storage. The question order is stable for the
/// lifetime of the attempt, including across [`Attempt::retry`], so a learner
/// always sees the same sequence.
///
/// Invariant: `position` stays within `[0, question_count)`; the assessment
/// type guarantees at least one question.
#[derive(Debug, Clone)]
pub struct Attempt {
    assessment: Assessment,
    answers: BTreeMap<usize, usize>,
    position: usize,
    outcome: Option<AssessmentResult>,
}

impl Attempt {
    /// Begins an attempt at the first question with no answers recorded.
    #[must_use]
    pub fn start(assessment: Assessment) -> Self {
        Self {
            assessment,
            answers: BTreeMap::new(),
            position: 0,
            outcome: None,
        }
    }

    #[must_use]
    pub fn assessment(&self) -> &Assessment {
        &self.assessment
    }

    /// Current question position, 0-based.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The question at the current position.
    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.assessment.questions()[self.position]
    }

    /// The recorded answer for the current question, if any.
    #[must_use]
    pub fn selected_answer(&self) -> Option<usize> {
        self.answers.get(&self.position).copied()
    }

    /// The recorded answer at an arbitrary position, if any.
    #[must_use]
    pub fn answer_at(&self, position: usize) -> Option<usize> {
        self.answers.get(&position).copied()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }

    /// The result, once the terminal transition has happened.
    #[must_use]
    pub fn outcome(&self) -> Option<&AssessmentResult> {
        self.outcome.as_ref()
    }

    /// Records the answer for the current question, overwriting any earlier
    /// selection at this position. Ignored once the attempt is complete.
    ///
    /// # Panics
    ///
    /// Panics when `option_index` is out of range for the current question.
    /// That is an upstream data-integrity violation, not a user error: valid
    /// catalog data can never produce it.
    pub fn select_answer(&mut self, option_index: usize) {
        if self.is_complete() {
            return;
        }
        let options = self.current_question().option_count();
        assert!(
            option_index < options,
            "option index {option_index} out of range for {options} options"
        );
        self.answers.insert(self.position, option_index);
    }

    /// Steps back one question without clearing any answers. No-op at the
    /// first question and once the attempt is complete.
    pub fn go_to_previous(&mut self) {
        if self.is_complete() {
            return;
        }
        self.position = self.position.saturating_sub(1);
    }

    /// Advances past the current question.
    ///
    /// Ignored while the current question is unanswered — the UI disables the
    /// control, and the engine refuses rather than corrupt state — and after
    /// completion. Advancing past the final question is the terminal
    /// transition: the result is computed over whatever answers exist at that
    /// moment, with unanswered questions counting as incorrect (back
    /// navigation can leave earlier positions unanswered).
    pub fn advance(&mut self) -> Advance {
        if self.is_complete() || self.selected_answer().is_none() {
            return Advance::Ignored;
        }
        if self.position < self.assessment.last_index() {
            self.position += 1;
            return Advance::Moved;
        }

        let result = scoring::score_attempt(&self.assessment, &self.answers);
        self.outcome = Some(result);
        Advance::Completed(result)
    }

    /// Resets a completed attempt for another try: answers cleared, position
    /// back to the first question, question order untouched.
    ///
    /// Returns false (and changes nothing) while the attempt is still in
    /// progress.
    pub fn retry(&mut self) -> bool {
        if !self.is_complete() {
            return false;
        }
        self.answers.clear();
        self.position = 0;
        self.outcome = None;
        true
    }

    /// Progress snapshot for the UI (1-based current position).
    #[must_use]
    pub fn progress(&self) -> AttemptProgress {
        AttemptProgress {
            current: self.position + 1,
            total: self.assessment.question_count(),
            answered: self.answers.len(),
            is_complete: self.is_complete(),
        }
    }

    /// Per-question breakdown for the result summary screen.
    #[must_use]
    pub fn review(&self) -> Vec<QuestionReview> {
        self.assessment
            .questions()
            .iter()
            .enumerate()
            .map(|(position, question)| {
                let selected = self.answers.get(&position).copied();
                QuestionReview {
                    position,
                    selected,
                    correct_option: question.correct_option(),
                    is_correct: selected.is_some_and(|s| question.is_correct(s)),
                }
            })
            .collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
