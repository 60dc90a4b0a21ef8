//! Category deriver: combines the bundled content with stored answers,
//! progress and completion flags into the home-screen cards.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, warn};
use quiz_core::model::{
    Category, CategoryCard, CompletionMap, FileEntry, Manifest, ProgressMap, Question, QuestionId,
};
use storage::content::ContentSource;
use storage::repository::{AnswerRepository, CompletionRepository, ProgressRepository};

use crate::error::CatalogError;

//
// ─── VIEW ──────────────────────────────────────────────────────────────────────
//

/// Cards of one manifest group (list layout).
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub name: String,
    pub cards: Vec<CategoryCard>,
}

/// Everything the home screen renders.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeView {
    pub header_title: String,
    pub list_mode: bool,
    /// Grouped file categories; empty in the flat layout.
    pub groups: Vec<CategoryGroup>,
    /// Flat file categories followed by the enabled pseudo-categories.
    pub categories: Vec<CategoryCard>,
}

impl HomeView {
    /// Every card, grouped ones first.
    pub fn cards(&self) -> impl Iterator<Item = &CategoryCard> {
        self.groups
            .iter()
            .flat_map(|group| group.cards.iter())
            .chain(self.categories.iter())
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&CategoryCard> {
        self.cards().find(|card| card.category.id == id)
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

#[derive(Clone)]
pub struct CatalogService {
    content: Arc<dyn ContentSource>,
    answers: Arc<dyn AnswerRepository>,
    progress: Arc<dyn ProgressRepository>,
    completion: Arc<dyn CompletionRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(
        content: Arc<dyn ContentSource>,
        answers: Arc<dyn AnswerRepository>,
        progress: Arc<dyn ProgressRepository>,
        completion: Arc<dyn CompletionRepository>,
    ) -> Self {
        Self {
            content,
            answers,
            progress,
            completion,
        }
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Content` if the manifest is missing or malformed.
    pub fn manifest(&self) -> Result<Manifest, CatalogError> {
        Ok(self.content.manifest()?)
    }

    /// Questions of one file. An unreadable file yields an empty list.
    #[must_use]
    pub fn load_questions(&self, file: &FileEntry) -> Vec<Question> {
        self.read_file(file).unwrap_or_default()
    }

    /// Every question of every active file, in manifest order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Content` if the manifest cannot be read.
    pub fn load_pool(&self) -> Result<Vec<Question>, CatalogError> {
        let manifest = self.manifest()?;
        Ok(self.pool_for(&manifest))
    }

    #[must_use]
    pub fn pool_for(&self, manifest: &Manifest) -> Vec<Question> {
        manifest
            .active_files()
            .iter()
            .flat_map(|file| self.load_questions(file))
            .collect()
    }

    /// `None` when the file is absent or unreadable.
    fn read_file(&self, file: &FileEntry) -> Option<Vec<Question>> {
        let Some(file_name) = file.file_name.as_deref() else {
            debug!("category {} has no question file", file.id);
            return None;
        };
        match self.content.load_file(file_name) {
            Ok(raw) => {
                let info = file.info();
                let total = raw.len();
                let questions: Vec<Question> = raw
                    .into_iter()
                    .filter(|q| q.has_id())
                    .map(|q| q.into_question(&info))
                    .collect();
                if questions.len() < total {
                    warn!(
                        "skipping {} entries without an id in {file_name}",
                        total - questions.len()
                    );
                }
                Some(questions)
            }
            Err(err) => {
                warn!("skipping question file {file_name}: {err}");
                None
            }
        }
    }

    fn file_category(&self, file: FileEntry, known: &mut HashSet<QuestionId>) -> Category {
        let total = match self.read_file(&file) {
            Some(questions) => {
                let total = questions.len();
                known.extend(questions.into_iter().map(|q| q.id().clone()));
                total
            }
            None => file
                .count
                .map_or(0, |count| usize::try_from(count).unwrap_or(usize::MAX)),
        };
        Category::from_file(file, total)
    }

    /// Build the home screen.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the manifest or stored state cannot be read.
    pub async fn home(&self) -> Result<HomeView, CatalogError> {
        let manifest = self.manifest()?;
        let answers = self.answers.load_answers().await?;
        let progress = self.progress.load_progress().await?;
        let completion = self.completion.load_completed().await?;
        let config = &manifest.config;

        let mut known = HashSet::new();
        let mut groups = Vec::new();
        for group in manifest.groups() {
            let mut cards = Vec::with_capacity(group.files.len());
            for file in group.files {
                let category = self.file_category(file, &mut known);
                cards.push(CategoryCard::derive(category, &progress, &completion));
            }
            groups.push(CategoryGroup {
                name: group.name,
                cards,
            });
        }

        let mut categories: Vec<Category> = manifest
            .flat_files()
            .into_iter()
            .map(|file| self.file_category(file, &mut known))
            .collect();
        if config.favorites_enabled() {
            categories.push(Category::favorites(answers.count_favorites(&known)));
        }
        if config.wrong_enabled() {
            categories.push(Category::wrong(answers.count_wrong(&known)));
        }
        if config.mock_enabled() {
            categories.push(Category::mock());
        }

        debug!(
            "home: {} groups, {} categories, {} known questions",
            groups.len(),
            categories.len(),
            known.len()
        );

        Ok(HomeView {
            header_title: config.header_title().to_owned(),
            list_mode: config.list_mode(),
            groups,
            categories: derive_cards(categories, &progress, &completion),
        })
    }

    /// Look up a category shown on the home screen by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownCategory` if no enabled category has this id.
    pub async fn find_category(&self, id: &str) -> Result<Category, CatalogError> {
        let home = self.home().await?;
        home.find(id)
            .map(|card| card.category.clone())
            .ok_or_else(|| CatalogError::UnknownCategory(id.to_owned()))
    }
}

fn derive_cards(
    categories: Vec<Category>,
    progress: &ProgressMap,
    completion: &CompletionMap,
) -> Vec<CategoryCard> {
    categories
        .into_iter()
        .map(|category| CategoryCard::derive(category, progress, completion))
        .collect()
}
