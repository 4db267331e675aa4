#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    AssessmentRepository, CompletionRepository, CourseRepository, InMemoryRepository,
    ProfileRepository, Storage, StorageError,
};
