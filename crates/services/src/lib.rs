#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod error;
pub mod launcher;
pub mod quiz;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use catalog::{CatalogService, CategoryGroup, HomeView};
pub use error::{AppServicesError, CatalogError, LaunchError, QuizError};
pub use launcher::{QuizLaunch, SessionLauncher};
pub use quiz::{
    Advance, ChoiceOutcome, Phase, QuizLoopService, QuizProgress, QuizSession, StepOutcome,
    Submission,
};
