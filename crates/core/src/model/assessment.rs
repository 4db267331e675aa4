use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::locale::LocalizedText;
use crate::model::ids::{AssessmentId, CourseId, LessonId, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error("assessment has no questions")]
    NoQuestions,

    #[error("question needs at least {min} options, got {got}")]
    TooFewOptions { min: usize, got: usize },

    #[error("correct option {index} is out of range for {options} options")]
    CorrectOptionOutOfRange { index: usize, options: usize },

    #[error("pass threshold must be at most 100, got {got}")]
    ThresholdOutOfRange { got: u8 },
}

//
// ─── ATTACHMENT ────────────────────────────────────────────────────────────────
//

/// What an assessment gates: a single lesson's quiz, or a course pre-test
/// taken before enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attachment {
    Lesson(LessonId),
    PreTest(CourseId),
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single-choice question. Immutable once constructed; an attempt only ever
/// reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: LocalizedText,
    options: Vec<LocalizedText>,
    correct_option: usize,
}

impl Question {
    /// A single-choice question is meaningless with fewer than two options.
    pub const MIN_OPTIONS: usize = 2;

    /// Builds a validated question.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::TooFewOptions` when fewer than
    /// [`Question::MIN_OPTIONS`] options are given, and
    /// `AssessmentError::CorrectOptionOutOfRange` when `correct_option` does
    /// not index into `options`.
    pub fn new(
        id: QuestionId,
        prompt: LocalizedText,
        options: Vec<LocalizedText>,
        correct_option: usize,
    ) -> Result<Self, AssessmentError> {
        if options.len() < Self::MIN_OPTIONS {
            return Err(AssessmentError::TooFewOptions {
                min: Self::MIN_OPTIONS,
                got: options.len(),
            });
        }
        if correct_option >= options.len() {
            return Err(AssessmentError::CorrectOptionOutOfRange {
                index: correct_option,
                options: options.len(),
            });
        }

        Ok(Self {
            id,
            prompt,
            options,
            correct_option,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &LocalizedText {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[LocalizedText] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn correct_option(&self) -> usize {
        self.correct_option
    }

    /// Returns true when the given option index is the correct answer.
    #[must_use]
    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_option
    }
}

//
// ─── ASSESSMENT ────────────────────────────────────────────────────────────────
//

/// An ordered set of single-choice questions with a pass threshold.
///
/// Construction rejects an empty question list, so downstream code (the
/// attempt engine in particular) never has to handle a zero-question
/// assessment: records that arrive from storage without questions are dropped
/// before they become an `Assessment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    id: AssessmentId,
    attachment: Attachment,
    questions: Vec<Question>,
    pass_threshold: u8,
}

impl Assessment {
    /// Score required to pass when none is configured.
    pub const DEFAULT_PASS_THRESHOLD: u8 = 80;

    /// Builds an assessment with the default pass threshold.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::NoQuestions` when `questions` is empty.
    pub fn new(
        id: AssessmentId,
        attachment: Attachment,
        questions: Vec<Question>,
    ) -> Result<Self, AssessmentError> {
        Self::with_threshold(id, attachment, questions, Self::DEFAULT_PASS_THRESHOLD)
    }

    /// Builds an assessment with an explicit pass threshold (0–100).
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::NoQuestions` for an empty question list, or
    /// `AssessmentError::ThresholdOutOfRange` when `pass_threshold > 100`.
    pub fn with_threshold(
        id: AssessmentId,
        attachment: Attachment,
        questions: Vec<Question>,
        pass_threshold: u8,
    ) -> Result<Self, AssessmentError> {
        if questions.is_empty() {
            return Err(AssessmentError::NoQuestions);
        }
        if pass_threshold > 100 {
            return Err(AssessmentError::ThresholdOutOfRange {
                got: pass_threshold,
            });
        }

        Ok(Self {
            id,
            attachment,
            questions,
            pass_threshold,
        })
    }

    #[must_use]
    pub fn id(&self) -> AssessmentId {
        self.id
    }

    #[must_use]
    pub fn attachment(&self) -> Attachment {
        self.attachment
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions. Always at least 1.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn question(&self, position: usize) -> Option<&Question> {
        self.questions.get(position)
    }

    /// Position of the final question.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.questions.len() - 1
    }

    #[must_use]
    pub fn pass_threshold(&self) -> u8 {
        self.pass_threshold
    }

    /// The lesson this assessment is a quiz for, when it is one.
    #[must_use]
    pub fn lesson_id(&self) -> Option<LessonId> {
        match self.attachment {
            Attachment::Lesson(id) => Some(id),
            Attachment::PreTest(_) => None,
        }
    }

    #[must_use]
    pub fn is_pre_test(&self) -> bool {
        matches!(self.attachment, Attachment::PreTest(_))
    }
}
