use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use academy_core::gating;
use academy_core::model::{AssessmentId, Course};
use academy_core::scoring::AssessmentResult;
use storage::repository::AssessmentRepository;

use super::attempt::Attempt;
use crate::error::AssessmentFlowError;

/// Orchestrates assessment attempts against storage and keeps the session's
/// latest outcomes.
///
/// Outcomes are session-scoped on purpose: a passed pre-test or lesson quiz
/// unlocks content for the rest of the session and is never persisted.
/// Attempts themselves are plain values handed to the caller; closing the
/// flow just drops them, and nothing partial survives.
pub struct AssessmentFlowService {
    assessments: Arc<dyn AssessmentRepository>,
    outcomes: Mutex<HashMap<AssessmentId, AssessmentResult>>,
}

impl AssessmentFlowService {
    #[must_use]
    pub fn new(assessments: Arc<dyn AssessmentRepository>) -> Self {
        Self {
            assessments,
            outcomes: Mutex::new(HashMap::new()),
        }
    }

    fn outcomes_guard(&self) -> MutexGuard<'_, HashMap<AssessmentId, AssessmentResult>> {
        self.outcomes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads an assessment and opens a fresh attempt on it.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentFlowError::Unavailable` when the assessment cannot
    /// be loaded, so the presentation layer shows a retry affordance instead
    /// of an empty quiz.
    pub async fn open(&self, id: AssessmentId) -> Result<Attempt, AssessmentFlowError> {
        let assessment = self.assessments.get_assessment(id).await.map_err(|err| {
            tracing::warn!(assessment = %id, error = %err, "assessment failed to load");
            AssessmentFlowError::Unavailable(err)
        })?;
        Ok(Attempt::start(assessment))
    }

    /// Records a finished attempt's result as the latest in-session outcome
    /// for its assessment, and returns it.
    ///
    /// Returns `None` (recording nothing) when the attempt has not reached
    /// its terminal transition — only an explicitly completed result may
    /// unlock anything.
    pub fn submit(&self, attempt: &Attempt) -> Option<AssessmentResult> {
        let outcome = attempt.outcome().copied()?;
        self.outcomes_guard()
            .insert(outcome.assessment_id(), outcome);
        tracing::info!(
            assessment = %outcome.assessment_id(),
            score = outcome.score(),
            passed = outcome.passed(),
            "assessment completed"
        );
        Some(outcome)
    }

    /// The latest in-session result for an assessment, if any.
    #[must_use]
    pub fn latest_result(&self, id: AssessmentId) -> Option<AssessmentResult> {
        self.outcomes_guard().get(&id).copied()
    }

    /// Whether the latest in-session result for an assessment passed.
    #[must_use]
    pub fn has_passed(&self, id: AssessmentId) -> bool {
        self.latest_result(id).is_some_and(|r| r.passed())
    }

    /// Whether the course's pre-test gate is currently satisfied.
    #[must_use]
    pub fn passed_pre_test(&self, course: &Course) -> bool {
        course
            .pre_test()
            .is_some_and(|pre_test| self.has_passed(pre_test.id()))
    }

    /// Whether the learner may enter the course right now.
    #[must_use]
    pub fn is_course_unlocked(&self, course: &Course, privileged: bool) -> bool {
        gating::is_course_unlocked(course, self.passed_pre_test(course), privileged)
    }

    /// Drops the in-session result for one assessment. The quiz state resets
    /// when the learner moves to another lesson.
    pub fn clear(&self, id: AssessmentId) {
        self.outcomes_guard().remove(&id);
    }

    /// Drops every in-session result (sign-out, flow teardown).
    pub fn clear_all(&self) {
        self.outcomes_guard().clear();
    }
}
