mod assessment;
mod catalog;
mod ids;
mod learner;
mod progress;

pub use assessment::{Assessment, AssessmentError, Attachment, Question};
pub use catalog::{CatalogError, Course, Lesson, Module};
pub use ids::{
    AssessmentId, CourseId, LearnerId, LessonId, ModuleId, ParseIdError, QuestionId,
};
pub use learner::Role;
pub use progress::CompletionRecord;
