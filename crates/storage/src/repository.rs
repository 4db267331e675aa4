use academy_core::model::{
    Assessment, AssessmentId, CompletionRecord, Course, CourseId, LearnerId, LessonId, Role,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
///
/// `Connection` is the recoverable "persistence failed" signal: callers must
/// surface it (or fall back to the most restrictive gating view), never treat
/// the operation as having succeeded.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

/// Catalog reads and admin-side writes.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Persist or replace a full course aggregate (modules, lessons, quizzes,
    /// pre-test).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be stored.
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError>;

    /// Fetch one course with its full content tree, ordered for display.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_course(&self, id: CourseId) -> Result<Course, StorageError>;

    /// Fetch every course, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn list_courses(&self) -> Result<Vec<Course>, StorageError>;
}

/// Direct assessment lookup for the quiz flow.
#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    /// Fetch an assessment with its ordered questions.
    ///
    /// An assessment whose question list is empty is treated as missing: the
    /// quiz flow must never be handed a question-less assessment.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing or empty, or other storage
    /// errors.
    async fn get_assessment(&self, id: AssessmentId) -> Result<Assessment, StorageError>;
}

/// Per-learner lesson completion state.
#[async_trait]
pub trait CompletionRepository: Send + Sync {
    /// Upsert keyed on `(learner, lesson)`. Concurrent duplicate calls
    /// collapse into a single record; re-marking a completed lesson simply
    /// overwrites the same logical state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn upsert_completion(&self, record: &CompletionRecord) -> Result<(), StorageError>;

    /// Fetch the learner's records for the given lessons. Lessons with no
    /// record are simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn list_completions(
        &self,
        learner_id: LearnerId,
        lesson_ids: &[LessonId],
    ) -> Result<Vec<CompletionRecord>, StorageError>;
}

/// Learner profile data owned by the auth collaborator.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Persist or update a learner's role.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be stored.
    async fn upsert_profile(&self, learner_id: LearnerId, role: Role) -> Result<(), StorageError>;

    /// Fetch a learner's role.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown learner, or other
    /// storage errors.
    async fn get_role(&self, learner_id: LearnerId) -> Result<Role, StorageError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    courses: Arc<Mutex<HashMap<CourseId, Course>>>,
    assessments: Arc<Mutex<HashMap<AssessmentId, Assessment>>>,
    completions: Arc<Mutex<HashMap<(LearnerId, LessonId), CompletionRecord>>>,
    profiles: Arc<Mutex<HashMap<LearnerId, Role>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<'a, T>(guard: &'a Arc<Mutex<T>>) -> Result<std::sync::MutexGuard<'a, T>, StorageError> {
        guard
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        {
            let mut assessments = Self::lock(&self.assessments)?;
            for lesson in course.lessons() {
                if let Some(quiz) = lesson.quiz() {
                    assessments.insert(quiz.id(), quiz.clone());
                }
            }
            if let Some(pre_test) = course.pre_test() {
                assessments.insert(pre_test.id(), pre_test.clone());
            }
        }
        let mut courses = Self::lock(&self.courses)?;
        courses.insert(course.id(), course.clone());
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Course, StorageError> {
        let courses = Self::lock(&self.courses)?;
        courses.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let courses = Self::lock(&self.courses)?;
        let mut all: Vec<Course> = courses.values().cloned().collect();
        all.sort_by_key(|c| (c.created_at(), c.id().value()));
        Ok(all)
    }
}

#[async_trait]
impl AssessmentRepository for InMemoryRepository {
    async fn get_assessment(&self, id: AssessmentId) -> Result<Assessment, StorageError> {
        let assessments = Self::lock(&self.assessments)?;
        assessments.get(&id).cloned().ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl CompletionRepository for InMemoryRepository {
    async fn upsert_completion(&self, record: &CompletionRecord) -> Result<(), StorageError> {
        let mut completions = Self::lock(&self.completions)?;
        completions.insert((record.learner_id(), record.lesson_id()), record.clone());
        Ok(())
    }

    async fn list_completions(
        &self,
        learner_id: LearnerId,
        lesson_ids: &[LessonId],
    ) -> Result<Vec<CompletionRecord>, StorageError> {
        let completions = Self::lock(&self.completions)?;
        Ok(lesson_ids
            .iter()
            .filter_map(|&lesson_id| completions.get(&(learner_id, lesson_id)).cloned())
            .collect())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn upsert_profile(&self, learner_id: LearnerId, role: Role) -> Result<(), StorageError> {
        let mut profiles = Self::lock(&self.profiles)?;
        profiles.insert(learner_id, role);
        Ok(())
    }

    async fn get_role(&self, learner_id: LearnerId) -> Result<Role, StorageError> {
        let profiles = Self::lock(&self.profiles)?;
        profiles.get(&learner_id).copied().ok_or(StorageError::NotFound)
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub courses: Arc<dyn CourseRepository>,
    pub assessments: Arc<dyn AssessmentRepository>,
    pub completions: Arc<dyn CompletionRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            courses: Arc::new(repo.clone()),
            assessments: Arc::new(repo.clone()),
            completions: Arc::new(repo.clone()),
            profiles: Arc::new(repo),
        }
    }
}
