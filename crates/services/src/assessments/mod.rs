mod attempt;
mod view;
mod workflow;

// Public API of the assessment subsystem.
pub use attempt::{Advance, Attempt};
pub use view::{AttemptProgress, QuestionReview};
pub use workflow::AssessmentFlowService;
