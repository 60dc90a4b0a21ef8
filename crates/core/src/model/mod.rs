mod answer;
mod category;
mod ids;
pub mod manifest;
mod mode;
mod progress;
pub mod question;
mod score;

pub use answer::{AnswerBook, AnswerRecord};
pub use category::{
    Category, CategoryCard, CategoryKind, FAVORITE_CATEGORY_ID, MOCK_CATEGORY_ID, MOCK_EXAM_SIZE,
    PrimaryAction, WRONG_CATEGORY_ID,
};
pub use ids::{ParseIdError, QuestionId};
pub use manifest::{FileEntry, FileGroup, Manifest, ManifestConfig, ManifestError};
pub use mode::{ModePolicies, ModePolicy, ParseModeError, SessionKey, ViewMode};
pub use progress::{CompletionMap, ProgressMap};
pub use question::{
    FileInfo, OptionKey, Question, QuestionType, RawQuestion, normalize_answer,
};
pub use score::{QuizOutcome, QuizScore, QuizSummary};
