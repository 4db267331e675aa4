use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use academy_core::Clock;
use academy_core::gating;
use academy_core::model::{CompletionRecord, Course, LearnerId, Lesson, LessonId};
use academy_core::scoring::AssessmentResult;
use storage::repository::CompletionRepository;

use crate::error::ProgressError;
use crate::session::Generations;

//
// ─── VIEWS ─────────────────────────────────────────────────────────────────────
//

/// Aggregated view of a learner's progress in one course, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseProgress {
    pub completed_lessons: usize,
    pub total_lessons: usize,
    pub percent: u8,
    pub is_complete: bool,
}

/// Cross-course dashboard stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub overall_percent: u8,
    pub completed_courses: usize,
}

//
// ─── PROGRESS SERVICE ──────────────────────────────────────────────────────────
//

/// Orchestrates completion records for the course currently open in the
/// classroom: fetching them, deriving gating decisions, and committing the
/// "finish lesson" action.
pub struct ProgressService {
    clock: Clock,
    completions: Arc<dyn CompletionRepository>,
    generations: Generations,
    records: Mutex<Vec<CompletionRecord>>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, completions: Arc<dyn CompletionRepository>) -> Self {
        Self {
            clock,
            completions,
            generations: Generations::new(),
            records: Mutex::new(Vec::new()),
        }
    }

    fn records_guard(&self) -> MutexGuard<'_, Vec<CompletionRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the currently cached records.
    #[must_use]
    pub fn records(&self) -> Vec<CompletionRecord> {
        self.records_guard().clone()
    }

    /// Re-fetches the learner's records for one course.
    ///
    /// Rapid course switches can leave several of these in flight; only the
    /// newest issued request may commit its response ("last request issued
    /// wins"), so a slow stale fetch can never clobber a newer one. On fetch
    /// failure the cache is cleared — gating then reads every lesson as
    /// not-completed, the most restrictive interpretation — and the error
    /// propagates so the caller can offer a retry.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` when the fetch fails.
    pub async fn refresh(
        &self,
        learner_id: LearnerId,
        course: &Course,
    ) -> Result<(), ProgressError> {
        let token = self.generations.begin();
        let fetched = self
            .completions
            .list_completions(learner_id, &course.lesson_ids())
            .await;

        if !self.generations.is_current(token) {
            tracing::debug!(course = %course.id(), "discarding stale completion fetch");
            return Ok(());
        }

        match fetched {
            Ok(records) => {
                *self.records_guard() = records;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    course = %course.id(),
                    error = %err,
                    "completion fetch failed; treating lessons as not completed"
                );
                self.records_guard().clear();
                Err(err.into())
            }
        }
    }

    /// Whether the cached records mark this lesson completed.
    #[must_use]
    pub fn is_lesson_completed(&self, lesson_id: LessonId) -> bool {
        gating::is_completed(&self.records_guard(), lesson_id)
    }

    /// Whether the learner may enter the lesson right now.
    #[must_use]
    pub fn is_lesson_unlocked(
        &self,
        lesson: &Lesson,
        latest_result: Option<&AssessmentResult>,
        privileged: bool,
    ) -> bool {
        gating::is_lesson_unlocked(lesson, &self.records_guard(), latest_result, privileged)
    }

    /// Whether the "finish lesson" action is currently allowed.
    #[must_use]
    pub fn can_finish(
        &self,
        lesson: &Lesson,
        latest_result: Option<&AssessmentResult>,
        privileged: bool,
    ) -> bool {
        gating::can_finish_lesson(
            lesson,
            self.is_lesson_completed(lesson.id()),
            latest_result,
            privileged,
        )
    }

    /// Commits a lesson completion.
    ///
    /// The finish precondition is re-checked against current cached state
    /// before writing, as a defense against stale UI state. The cache is
    /// updated only after the upsert is confirmed: a failed write never
    /// unlocks anything locally. Marking an already-completed lesson is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::LessonLocked` when the precondition fails, or
    /// `ProgressError::Storage` when the upsert fails.
    pub async fn mark_lesson_complete(
        &self,
        learner_id: LearnerId,
        lesson: &Lesson,
        latest_result: Option<&AssessmentResult>,
        privileged: bool,
    ) -> Result<(), ProgressError> {
        if self.is_lesson_completed(lesson.id()) {
            return Ok(());
        }
        if !self.can_finish(lesson, latest_result, privileged) {
            return Err(ProgressError::LessonLocked);
        }

        let record = CompletionRecord::completed_now(learner_id, lesson.id(), self.clock.now());
        self.completions.upsert_completion(&record).await?;
        tracing::info!(lesson = %lesson.id(), "lesson completed");

        let mut records = self.records_guard();
        records.retain(|r| r.lesson_id() != lesson.id());
        records.push(record);
        Ok(())
    }

    /// Progress through one course, computed from the cached records.
    #[must_use]
    pub fn course_progress(&self, course: &Course) -> CourseProgress {
        let records = self.records_guard();
        let total_lessons = course.total_lessons();
        let completed_lessons = course
            .lesson_ids()
            .iter()
            .filter(|&&id| gating::is_completed(&records, id))
            .count();

        CourseProgress {
            completed_lessons,
            total_lessons,
            percent: gating::progress_percent(completed_lessons, total_lessons),
            is_complete: gating::is_course_completed(course, &records),
        }
    }

    /// Dashboard stats across the whole catalog. Fetches fresh records for
    /// every course rather than trusting the single-course cache.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` when the fetch fails.
    pub async fn dashboard_stats(
        &self,
        learner_id: LearnerId,
        courses: &[Course],
    ) -> Result<DashboardStats, ProgressError> {
        let mut all_lessons = Vec::new();
        for course in courses {
            all_lessons.extend(course.lesson_ids());
        }
        let records = self
            .completions
            .list_completions(learner_id, &all_lessons)
            .await?;

        let completed = records.iter().filter(|r| r.is_completed()).count();
        let completed_courses = courses
            .iter()
            .filter(|course| gating::is_course_completed(course, &records))
            .count();

        Ok(DashboardStats {
            overall_percent: gating::progress_percent(completed, all_lessons.len()),
            completed_courses,
        })
    }
}
