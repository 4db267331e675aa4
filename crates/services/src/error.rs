//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the assessment flow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssessmentFlowError {
    /// The assessment could not be loaded. Presentation shows this as
    /// "unavailable, try again" — never an empty quiz.
    #[error("assessment is unavailable")]
    Unavailable(#[source] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    /// The finish precondition failed on re-check; the UI state that offered
    /// the action was stale.
    #[error("lesson is locked until its quiz is passed")]
    LessonLocked,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
