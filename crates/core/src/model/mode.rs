use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// How a quiz session presents its questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewMode {
    Quiz,
    Review,
    Favorite,
    Wrong,
    Mock,
}

impl ViewMode {
    pub const ALL: [ViewMode; 5] = [
        Self::Quiz,
        Self::Review,
        Self::Favorite,
        Self::Wrong,
        Self::Mock,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quiz => "QUIZ",
            Self::Review => "REVIEW",
            Self::Favorite => "FAVORITE",
            Self::Wrong => "WRONG",
            Self::Mock => "MOCK",
        }
    }

    #[must_use]
    pub fn is_review(self) -> bool {
        matches!(self, Self::Review)
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown view mode: {0}")]
pub struct ParseModeError(String);

impl FromStr for ViewMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == upper)
            .ok_or_else(|| ParseModeError(s.to_owned()))
    }
}

//
// ─── SESSION KEY ───────────────────────────────────────────────────────────────
//

/// Progress-map key for a (mode, category) pair.
///
/// Standard quizzes key by the bare title; every other mode is prefixed,
/// e.g. `FAVORITE_最愛練習`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKey(String);

impl SessionKey {
    #[must_use]
    pub fn for_mode(mode: ViewMode, title: &str) -> Self {
        match mode {
            ViewMode::Quiz => Self(title.to_owned()),
            other => Self(format!("{other}_{title}")),
        }
    }

    /// Wrap a key read back from storage.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ─── POLICIES ──────────────────────────────────────────────────────────────────
//

/// Persistence behaviour of a view mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModePolicy {
    /// Index changes are written to the progress map.
    pub persists_progress: bool,
    /// A fresh launch wipes answer history for the session's questions.
    pub clear_on_finish: bool,
}

/// Policy table for every view mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModePolicies {
    quiz: ModePolicy,
    review: ModePolicy,
    favorite: ModePolicy,
    wrong: ModePolicy,
    mock: ModePolicy,
}

impl Default for ModePolicies {
    fn default() -> Self {
        let persisted = ModePolicy {
            persists_progress: true,
            clear_on_finish: false,
        };
        Self {
            quiz: persisted,
            review: ModePolicy {
                persists_progress: false,
                clear_on_finish: false,
            },
            favorite: persisted,
            wrong: persisted,
            mock: persisted,
        }
    }
}

impl ModePolicies {
    #[must_use]
    pub fn get(&self, mode: ViewMode) -> ModePolicy {
        match mode {
            ViewMode::Quiz => self.quiz,
            ViewMode::Review => self.review,
            ViewMode::Favorite => self.favorite,
            ViewMode::Wrong => self.wrong,
            ViewMode::Mock => self.mock,
        }
    }

    fn get_mut(&mut self, mode: ViewMode) -> &mut ModePolicy {
        match mode {
            ViewMode::Quiz => &mut self.quiz,
            ViewMode::Review => &mut self.review,
            ViewMode::Favorite => &mut self.favorite,
            ViewMode::Wrong => &mut self.wrong,
            ViewMode::Mock => &mut self.mock,
        }
    }

    /// Switch on `clear_on_finish` for the given modes.
    #[must_use]
    pub fn with_clear_on_finish(mut self, modes: impl IntoIterator<Item = ViewMode>) -> Self {
        for mode in modes {
            self.get_mut(mode).clear_on_finish = true;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_keys_prefix_non_quiz_modes() {
        assert_eq!(SessionKey::for_mode(ViewMode::Quiz, "A001").as_str(), "A001");
        assert_eq!(
            SessionKey::for_mode(ViewMode::Wrong, "錯題複習").as_str(),
            "WRONG_錯題複習"
        );
        assert_eq!(
            SessionKey::for_mode(ViewMode::Mock, "模擬測驗").as_str(),
            "MOCK_模擬測驗"
        );
    }

    #[test]
    fn modes_parse_case_insensitively() {
        assert_eq!("review".parse::<ViewMode>().unwrap(), ViewMode::Review);
        assert_eq!(" MOCK ".parse::<ViewMode>().unwrap(), ViewMode::Mock);
        assert!("exam".parse::<ViewMode>().is_err());
    }

    #[test]
    fn review_never_persists_progress() {
        let policies = ModePolicies::default().with_clear_on_finish([ViewMode::Mock]);
        assert!(!policies.get(ViewMode::Review).persists_progress);
        assert!(policies.get(ViewMode::Quiz).persists_progress);
        assert!(policies.get(ViewMode::Mock).clear_on_finish);
        assert!(!policies.get(ViewMode::Wrong).clear_on_finish);
    }
}
