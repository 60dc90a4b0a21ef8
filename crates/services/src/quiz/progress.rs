/// Position within a quiz session, for headers and progress bars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizProgress {
    pub index: usize,
    pub total: usize,
    pub answered: usize,
    pub is_finished: bool,
}
