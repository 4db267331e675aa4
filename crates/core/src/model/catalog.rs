use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

use crate::locale::{Locale, LocaleVisibility, LocalizedText};
use crate::model::assessment::{Assessment, Attachment};
use crate::model::ids::{CourseId, LessonId, ModuleId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("invalid video url: {0}")]
    InvalidVideoUrl(String),

    #[error("quiz is not attached to this lesson")]
    MismatchedQuiz,

    #[error("pre-test is not attached to this course")]
    MismatchedPreTest,
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A single unit of content: a video plus body text, with an optional quiz
/// that gates finishing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: LocalizedText,
    body: LocalizedText,
    video_url: Option<Url>,
    duration_label: Option<String>,
    quiz: Option<Assessment>,
    order_index: u32,
}

impl Lesson {
    #[must_use]
    pub fn new(id: LessonId, title: LocalizedText, body: LocalizedText, order_index: u32) -> Self {
        Self {
            id,
            title,
            body,
            video_url: None,
            duration_label: None,
            quiz: None,
            order_index,
        }
    }

    /// Attaches a validated video URL.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidVideoUrl` when the string is not a URL.
    pub fn with_video_url(mut self, raw: &str) -> Result<Self, CatalogError> {
        let url = Url::parse(raw).map_err(|_| CatalogError::InvalidVideoUrl(raw.to_owned()))?;
        self.video_url = Some(url);
        Ok(self)
    }

    #[must_use]
    pub fn with_duration_label(mut self, label: impl Into<String>) -> Self {
        self.duration_label = Some(label.into());
        self
    }

    /// Attaches the lesson quiz.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::MismatchedQuiz` when the assessment is not
    /// attached to this lesson.
    pub fn with_quiz(mut self, quiz: Assessment) -> Result<Self, CatalogError> {
        if quiz.attachment() != Attachment::Lesson(self.id) {
            return Err(CatalogError::MismatchedQuiz);
        }
        self.quiz = Some(quiz);
        Ok(self)
    }

    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &LocalizedText {
        &self.title
    }

    #[must_use]
    pub fn body(&self) -> &LocalizedText {
        &self.body
    }

    #[must_use]
    pub fn video_url(&self) -> Option<&Url> {
        self.video_url.as_ref()
    }

    #[must_use]
    pub fn duration_label(&self) -> Option<&str> {
        self.duration_label.as_deref()
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&Assessment> {
        self.quiz.as_ref()
    }

    #[must_use]
    pub fn has_quiz(&self) -> bool {
        self.quiz.is_some()
    }

    #[must_use]
    pub fn order_index(&self) -> u32 {
        self.order_index
    }
}

//
// ─── MODULE ────────────────────────────────────────────────────────────────────
//

/// An ordered group of lessons inside a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    id: ModuleId,
    title: LocalizedText,
    lessons: Vec<Lesson>,
    order_index: u32,
}

impl Module {
    #[must_use]
    pub fn new(id: ModuleId, title: LocalizedText, order_index: u32) -> Self {
        Self {
            id,
            title,
            lessons: Vec::new(),
            order_index,
        }
    }

    /// Replaces the lesson list, sorted by `(order_index, id)` so display
    /// order never depends on fetch order.
    #[must_use]
    pub fn with_lessons(mut self, mut lessons: Vec<Lesson>) -> Self {
        lessons.sort_by_key(|l| (l.order_index(), l.id().value()));
        self.lessons = lessons;
        self
    }

    #[must_use]
    pub fn id(&self) -> ModuleId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &LocalizedText {
        &self.title
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn order_index(&self) -> u32 {
        self.order_index
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// The catalog aggregate: modules with lessons, an optional pre-test gating
/// enrollment, and an optional single-locale restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: LocalizedText,
    description: LocalizedText,
    language: Option<Locale>,
    modules: Vec<Module>,
    pre_test: Option<Assessment>,
    enable_lesson_qa: bool,
    created_at: DateTime<Utc>,
}

impl Course {
    #[must_use]
    pub fn new(id: CourseId, title: LocalizedText, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            description: LocalizedText::default(),
            language: None,
            modules: Vec::new(),
            pre_test: None,
            enable_lesson_qa: false,
            created_at,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: LocalizedText) -> Self {
        self.description = description;
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: Locale) -> Self {
        self.language = Some(language);
        self
    }

    /// Replaces the module list, sorted by `(order_index, id)`.
    #[must_use]
    pub fn with_modules(mut self, mut modules: Vec<Module>) -> Self {
        modules.sort_by_key(|m| (m.order_index(), m.id().value()));
        self.modules = modules;
        self
    }

    /// Attaches the course pre-test.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::MismatchedPreTest` when the assessment is not
    /// attached to this course.
    pub fn with_pre_test(mut self, pre_test: Assessment) -> Result<Self, CatalogError> {
        if pre_test.attachment() != Attachment::PreTest(self.id) {
            return Err(CatalogError::MismatchedPreTest);
        }
        self.pre_test = Some(pre_test);
        Ok(self)
    }

    #[must_use]
    pub fn with_lesson_qa(mut self, enabled: bool) -> Self {
        self.enable_lesson_qa = enabled;
        self
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &LocalizedText {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &LocalizedText {
        &self.description
    }

    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    #[must_use]
    pub fn pre_test(&self) -> Option<&Assessment> {
        self.pre_test.as_ref()
    }

    #[must_use]
    pub fn has_pre_test(&self) -> bool {
        self.pre_test.is_some()
    }

    #[must_use]
    pub fn lesson_qa_enabled(&self) -> bool {
        self.enable_lesson_qa
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Every lesson reachable through the course's modules, in display order.
    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.modules.iter().flat_map(|m| m.lessons().iter())
    }

    /// IDs of every reachable lesson, in display order.
    #[must_use]
    pub fn lesson_ids(&self) -> Vec<LessonId> {
        self.lessons().map(Lesson::id).collect()
    }

    #[must_use]
    pub fn total_lessons(&self) -> usize {
        self.modules.iter().map(|m| m.lessons().len()).sum()
    }

    /// Looks a lesson up across all modules.
    #[must_use]
    pub fn lesson(&self, id: LessonId) -> Option<&Lesson> {
        self.lessons().find(|l| l.id() == id)
    }
}

impl LocaleVisibility for Course {
    fn language(&self) -> Option<Locale> {
        self.language
    }
}
