use chrono::{DateTime, Utc};

use crate::model::mode::ViewMode;

/// Correct/total tally with a rounded percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
    pub percent: u32,
}

impl QuizScore {
    /// An empty session scores zero.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn from_counts(correct: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            (correct as f64 / total as f64 * 100.0).round() as u32
        };
        Self {
            correct,
            total,
            percent,
        }
    }
}

/// A finished, scored session.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSummary {
    pub title: String,
    pub mode: ViewMode,
    pub score: QuizScore,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// What the learner sees after advancing past the last question.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizOutcome {
    /// Review sessions end with a plain acknowledgment, no score.
    ReviewAcknowledged,
    Scored(QuizSummary),
}
