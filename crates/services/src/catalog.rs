use std::sync::Arc;

use academy_core::locale::{Locale, LocaleVisibility};
use academy_core::model::{Course, CourseId};
use storage::repository::CourseRepository;

use crate::error::CatalogServiceError;

/// Read side of the course catalog, plus the admin write-through.
pub struct CatalogService {
    courses: Arc<dyn CourseRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(courses: Arc<dyn CourseRepository>) -> Self {
        Self { courses }
    }

    /// Courses visible under the given locale, oldest first. A course with no
    /// explicit language shows up everywhere.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError` when the listing cannot be fetched.
    pub async fn visible_courses(&self, locale: Locale) -> Result<Vec<Course>, CatalogServiceError> {
        let mut courses = self.courses.list_courses().await?;
        courses.retain(|course| course.visible_in(locale));
        Ok(courses)
    }

    /// One course with its full content tree.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError` when the course is missing or the fetch
    /// fails.
    pub async fn course(&self, id: CourseId) -> Result<Course, CatalogServiceError> {
        Ok(self.courses.get_course(id).await?)
    }

    /// Persists a course aggregate authored in the admin console.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError` when the write fails.
    pub async fn save_course(&self, course: &Course) -> Result<(), CatalogServiceError> {
        Ok(self.courses.upsert_course(course).await?)
    }
}
