#![forbid(unsafe_code)]

pub mod gating;
pub mod locale;
pub mod model;
pub mod scoring;
pub mod time;

pub use locale::{Locale, LocaleVisibility, LocalizedText};
pub use scoring::AssessmentResult;
pub use time::Clock;
