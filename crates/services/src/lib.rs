#![forbid(unsafe_code)]

pub mod app_services;
pub mod assessments;
pub mod catalog;
pub mod error;
pub mod progress;
pub mod session;

pub use academy_core::Clock;

pub use app_services::AppServices;
pub use assessments::{Advance, AssessmentFlowService, Attempt, AttemptProgress, QuestionReview};
pub use catalog::CatalogService;
pub use error::{AppServicesError, AssessmentFlowError, CatalogServiceError, ProgressError};
pub use progress::{CourseProgress, DashboardStats, ProgressService};
pub use session::{Generation, Generations, SessionContext, SessionService};
