//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::links::LinkError;
use quiz_core::model::OptionKey;
use storage::content::ContentError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SessionLauncher`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LaunchError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by quiz sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no questions available for session")]
    Empty,
    #[error("session already finished")]
    Finished,
    #[error("review sessions are read-only")]
    ReadOnly,
    #[error("question has no selectable options")]
    NotSelectable,
    #[error("question has no option {0}")]
    UnknownOption(OptionKey),
    #[error("question already submitted")]
    AlreadySubmitted,
    #[error("no option selected")]
    EmptySelection,
    #[error("question is not multiple choice")]
    NotMultiChoice,
    #[error("only open questions can be revealed")]
    NotRevealable,
    #[error("question index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Content(#[from] ContentError),
}
