/// Aggregated view of attempt progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptProgress {
    /// 1-based position of the question being shown.
    pub current: usize,
    pub total: usize,
    pub answered: usize,
    pub is_complete: bool,
}

/// One row of the post-completion summary screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionReview {
    pub position: usize,
    pub selected: Option<usize>,
    pub correct_option: usize,
    pub is_correct: bool,
}
