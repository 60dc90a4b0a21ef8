use std::sync::Arc;

use storage::content::ContentSource;
use storage::repository::Storage;

use crate::Clock;
use crate::catalog::CatalogService;
use crate::error::AppServicesError;
use crate::launcher::SessionLauncher;
use crate::quiz::QuizLoopService;

/// Assembles the app-facing services over one storage backend and content source.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CatalogService>,
    launcher: Arc<SessionLauncher>,
    quiz_loop: Arc<QuizLoopService>,
}

impl AppServices {
    /// Wire services over an existing storage backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Content` if the manifest cannot be read.
    pub fn new(
        storage: &Storage,
        content: Arc<dyn ContentSource>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let manifest = content.manifest()?;
        let catalog = Arc::new(CatalogService::new(
            content,
            Arc::clone(&storage.answers),
            Arc::clone(&storage.progress),
            Arc::clone(&storage.completion),
        ));
        let launcher = Arc::new(SessionLauncher::new(
            Arc::clone(&catalog),
            Arc::clone(&storage.answers),
            Arc::clone(&storage.progress),
            Arc::clone(&storage.completion),
        ));
        let quiz_loop = Arc::new(
            QuizLoopService::new(
                clock,
                Arc::clone(&storage.answers),
                Arc::clone(&storage.progress),
                Arc::clone(&storage.completion),
            )
            .with_report_form_url(manifest.config.report_form_url()),
        );

        Ok(Self {
            catalog,
            launcher,
            quiz_loop,
        })
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// manifest cannot be read.
    pub async fn new_sqlite(
        db_url: &str,
        content: Arc<dyn ContentSource>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::new(&storage, content, clock)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn launcher(&self) -> Arc<SessionLauncher> {
        Arc::clone(&self.launcher)
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }
}
