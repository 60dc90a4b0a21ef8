//! Session launcher: picks the question subset and starting index for a
//! category in a given mode, resetting stored state on a fresh start.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info};
use quiz_core::model::{
    Category, CategoryKind, MOCK_EXAM_SIZE, ModePolicy, Question, QuestionId, SessionKey, ViewMode,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use storage::repository::{AnswerRepository, CompletionRepository, ProgressRepository};

use crate::catalog::CatalogService;
use crate::error::LaunchError;

/// Everything the quiz view needs to open a session.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizLaunch {
    pub title: String,
    pub mode: ViewMode,
    pub session_key: SessionKey,
    pub policy: ModePolicy,
    /// Launched pool, before any per-session filtering.
    pub questions: Vec<Question>,
    pub start_index: usize,
}

#[derive(Clone)]
pub struct SessionLauncher {
    catalog: Arc<CatalogService>,
    answers: Arc<dyn AnswerRepository>,
    progress: Arc<dyn ProgressRepository>,
    completion: Arc<dyn CompletionRepository>,
    mock_seed: Option<u64>,
}

impl SessionLauncher {
    #[must_use]
    pub fn new(
        catalog: Arc<CatalogService>,
        answers: Arc<dyn AnswerRepository>,
        progress: Arc<dyn ProgressRepository>,
        completion: Arc<dyn CompletionRepository>,
    ) -> Self {
        Self {
            catalog,
            answers,
            progress,
            completion,
            mock_seed: None,
        }
    }

    /// Draw mock exams from a seeded generator instead of the thread rng.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.mock_seed = Some(seed);
        self
    }

    /// Resolve the mode, collect the pool and decide where to start.
    ///
    /// # Errors
    ///
    /// Returns `LaunchError` if the manifest or stored state cannot be read,
    /// or if a fresh start cannot reset stored state.
    pub async fn launch(
        &self,
        category: &Category,
        requested: ViewMode,
    ) -> Result<QuizLaunch, LaunchError> {
        let manifest = self.catalog.manifest()?;
        let mode = category.resolve_mode(requested);
        let policy = manifest.config.mode_policies().get(mode);
        let session_key = category.session_key(mode);

        let questions = match category.kind {
            CategoryKind::File => category
                .file
                .as_ref()
                .map(|file| self.catalog.load_questions(file))
                .unwrap_or_default(),
            CategoryKind::Mock => self.sample_mock(self.catalog.pool_for(&manifest)),
            CategoryKind::Favorite => {
                let answers = self.answers.load_answers().await?;
                self.catalog
                    .pool_for(&manifest)
                    .into_iter()
                    .filter(|q| answers.is_favorite(q.id()))
                    .collect()
            }
            CategoryKind::Wrong => {
                let answers = self.answers.load_answers().await?;
                self.catalog
                    .pool_for(&manifest)
                    .into_iter()
                    .filter(|q| answers.is_wrong(q.id()))
                    .collect()
            }
        };

        let stored = self.progress.load_progress().await?.get(&session_key);
        if stored == 0 && (mode == ViewMode::Quiz || policy.clear_on_finish) {
            self.reset(&category.title, &session_key, &questions).await?;
        }
        let start_index = if policy.persists_progress { stored } else { 0 };

        debug!(
            "launch {} as {mode}: {} questions from index {start_index}",
            category.title,
            questions.len()
        );

        Ok(QuizLaunch {
            title: category.title.clone(),
            mode,
            session_key,
            policy,
            questions,
            start_index,
        })
    }

    async fn reset(
        &self,
        title: &str,
        key: &SessionKey,
        questions: &[Question],
    ) -> Result<(), LaunchError> {
        let ids: Vec<QuestionId> = questions.iter().map(|q| q.id().clone()).collect();
        self.completion.clear_completed(title).await?;
        self.progress.save_progress(key, 0).await?;
        self.answers.clear_answers(&ids).await?;
        info!("fresh start for {title}: cleared {} answer records", ids.len());
        Ok(())
    }

    fn sample_mock(&self, pool: Vec<Question>) -> Vec<Question> {
        match self.mock_seed {
            Some(seed) => sample_mock(pool, &mut StdRng::seed_from_u64(seed)),
            None => sample_mock(pool, &mut rand::rng()),
        }
    }
}

/// Up to `MOCK_EXAM_SIZE` distinct questions in random order.
fn sample_mock<R: rand::Rng + ?Sized>(pool: Vec<Question>, rng: &mut R) -> Vec<Question> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Question> = pool
        .into_iter()
        .filter(|q| seen.insert(q.id().clone()))
        .collect();
    unique.shuffle(rng);
    unique.truncate(MOCK_EXAM_SIZE);
    unique
}
