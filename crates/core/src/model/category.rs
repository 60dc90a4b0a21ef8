use crate::model::manifest::FileEntry;
use crate::model::mode::{SessionKey, ViewMode};
use crate::model::progress::{CompletionMap, ProgressMap};

/// Displayed size of the mock exam, independent of the pool size.
pub const MOCK_EXAM_SIZE: usize = 50;

pub const FAVORITE_CATEGORY_ID: &str = "favorite";
pub const WRONG_CATEGORY_ID: &str = "wrong";
pub const MOCK_CATEGORY_ID: &str = "mock";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    /// Backed by a static question file.
    File,
    Favorite,
    Wrong,
    Mock,
}

impl CategoryKind {
    /// Reserved ids map to pseudo-categories; anything else is a file.
    #[must_use]
    pub fn from_id(id: &str) -> Self {
        match id {
            FAVORITE_CATEGORY_ID => Self::Favorite,
            WRONG_CATEGORY_ID => Self::Wrong,
            MOCK_CATEGORY_ID => Self::Mock,
            _ => Self::File,
        }
    }

    #[must_use]
    pub fn is_pseudo(self) -> bool {
        !matches!(self, Self::File)
    }

    /// The mode a card's main button launches.
    #[must_use]
    pub fn launch_mode(self) -> ViewMode {
        match self {
            Self::File => ViewMode::Quiz,
            Self::Favorite => ViewMode::Favorite,
            Self::Wrong => ViewMode::Wrong,
            Self::Mock => ViewMode::Mock,
        }
    }

    #[must_use]
    pub fn description(self) -> Option<&'static str> {
        match self {
            Self::File => None,
            Self::Favorite => Some("練習您收藏的題目"),
            Self::Wrong => Some("針對答錯的題目進行複習"),
            Self::Mock => Some("隨機挑選 50 題進行模擬測試"),
        }
    }
}

/// A home-screen entry: a question file or a derived pseudo-category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub title: String,
    pub kind: CategoryKind,
    pub total: usize,
    pub file: Option<FileEntry>,
}

impl Category {
    #[must_use]
    pub fn from_file(file: FileEntry, total: usize) -> Self {
        Self {
            id: file.id.clone(),
            title: file.display_name.clone(),
            kind: CategoryKind::File,
            total,
            file: Some(file),
        }
    }

    #[must_use]
    pub fn favorites(total: usize) -> Self {
        Self::pseudo(FAVORITE_CATEGORY_ID, "最愛練習", CategoryKind::Favorite, total)
    }

    #[must_use]
    pub fn wrong(total: usize) -> Self {
        Self::pseudo(WRONG_CATEGORY_ID, "錯題複習", CategoryKind::Wrong, total)
    }

    #[must_use]
    pub fn mock() -> Self {
        Self::pseudo(MOCK_CATEGORY_ID, "模擬測驗", CategoryKind::Mock, MOCK_EXAM_SIZE)
    }

    fn pseudo(id: &str, title: &str, kind: CategoryKind, total: usize) -> Self {
        Self {
            id: id.to_owned(),
            title: title.to_owned(),
            kind,
            total,
            file: None,
        }
    }

    /// Pseudo-categories always run in their own mode; files run as a quiz
    /// unless a review was asked for.
    #[must_use]
    pub fn resolve_mode(&self, requested: ViewMode) -> ViewMode {
        match self.kind {
            CategoryKind::File if requested.is_review() => ViewMode::Review,
            kind => kind.launch_mode(),
        }
    }

    #[must_use]
    pub fn session_key(&self, mode: ViewMode) -> SessionKey {
        SessionKey::for_mode(mode, &self.title)
    }
}

//
// ─── CARD ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Start,
    Continue,
    Restart,
}

/// Display state for one category, reconciled from progress and completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCard {
    pub category: Category,
    /// Stored index for the category's launch-mode key.
    pub progress: usize,
    /// Count shown as "completed", never above `total`.
    pub display_progress: usize,
    pub progress_percent: f64,
    pub is_completed: bool,
    pub has_progress: bool,
    pub is_disabled: bool,
    pub can_review: bool,
    pub primary_action: PrimaryAction,
}

impl CategoryCard {
    /// A completed category with zero stored progress shows as fully progressed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn derive(category: Category, progress: &ProgressMap, completion: &CompletionMap) -> Self {
        let key = category.session_key(category.kind.launch_mode());
        let current = progress.get(&key);
        let is_completed = completion.is_completed(&category.title);
        let raw_display = if is_completed && current == 0 {
            category.total
        } else {
            current
        };
        let display_progress = raw_display.min(category.total);
        let progress_percent = if category.total > 0 {
            display_progress as f64 / category.total as f64 * 100.0
        } else {
            0.0
        };
        let has_progress = current > 0;
        let is_disabled = matches!(category.kind, CategoryKind::Favorite | CategoryKind::Wrong)
            && category.total == 0;
        let can_review = !category.kind.is_pseudo() && is_completed;
        let primary_action = if category.kind.is_pseudo() {
            PrimaryAction::Start
        } else if is_completed {
            PrimaryAction::Restart
        } else if has_progress {
            PrimaryAction::Continue
        } else {
            PrimaryAction::Start
        };

        Self {
            category,
            progress: current,
            display_progress,
            progress_percent,
            is_completed,
            has_progress,
            is_disabled,
            can_review,
            primary_action,
        }
    }
}
