use academy_core::Clock;
use storage::repository::Storage;

use crate::assessments::AssessmentFlowService;
use crate::catalog::CatalogService;
use crate::error::AppServicesError;
use crate::progress::ProgressService;
use crate::session::SessionService;

/// Bundles every service over one storage backend.
pub struct AppServices {
    pub catalog: CatalogService,
    pub session: SessionService,
    pub progress: ProgressService,
    pub assessments: AssessmentFlowService,
}

impl AppServices {
    /// Builds the service set over an existing storage aggregate.
    #[must_use]
    pub fn with_storage(clock: Clock, storage: &Storage) -> Self {
        Self {
            catalog: CatalogService::new(storage.courses.clone()),
            session: SessionService::new(storage.profiles.clone()),
            progress: ProgressService::new(clock, storage.completions.clone()),
            assessments: AssessmentFlowService::new(storage.assessments.clone()),
        }
    }

    /// In-memory services for tests and prototyping.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::with_storage(clock, &Storage::in_memory())
    }

    /// Services backed by `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` when the database cannot be opened or
    /// migrated.
    pub async fn sqlite(clock: Clock, database_url: &str) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(database_url).await?;
        Ok(Self::with_storage(clock, &storage))
    }
}
