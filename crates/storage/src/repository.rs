use async_trait::async_trait;
use quiz_core::model::{AnswerBook, AnswerRecord, CompletionMap, ProgressMap, QuestionId, SessionKey};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Answer history, one record per question id.
///
/// Missing records are not errors; callers treat them as blank.
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Read every stored record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the records cannot be read.
    async fn load_answers(&self) -> Result<AnswerBook, StorageError>;

    /// Insert or replace the record for its question id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn upsert_answer(&self, record: &AnswerRecord) -> Result<(), StorageError>;

    /// Delete the records for the given ids; unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the records cannot be removed.
    async fn clear_answers(&self, ids: &[QuestionId]) -> Result<(), StorageError>;
}

/// Last-viewed index per session key.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if progress cannot be read.
    async fn load_progress(&self) -> Result<ProgressMap, StorageError>;

    /// Overwrite the index stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if progress cannot be stored.
    async fn save_progress(&self, key: &SessionKey, index: usize) -> Result<(), StorageError>;
}

/// "Fully completed" flags per category title.
#[async_trait]
pub trait CompletionRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if completion flags cannot be read.
    async fn load_completed(&self) -> Result<CompletionMap, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the flag cannot be stored.
    async fn mark_completed(&self, title: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the flag cannot be removed.
    async fn clear_completed(&self, title: &str) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    answers: Arc<Mutex<HashMap<QuestionId, AnswerRecord>>>,
    progress: Arc<Mutex<HashMap<SessionKey, usize>>>,
    completed: Arc<Mutex<HashSet<String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl AnswerRepository for InMemoryRepository {
    async fn load_answers(&self) -> Result<AnswerBook, StorageError> {
        let guard = self.answers.lock().map_err(poisoned)?;
        Ok(guard.values().cloned().collect())
    }

    async fn upsert_answer(&self, record: &AnswerRecord) -> Result<(), StorageError> {
        let mut guard = self.answers.lock().map_err(poisoned)?;
        guard.insert(record.question_id().clone(), record.clone());
        Ok(())
    }

    async fn clear_answers(&self, ids: &[QuestionId]) -> Result<(), StorageError> {
        let mut guard = self.answers.lock().map_err(poisoned)?;
        for id in ids {
            guard.remove(id);
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(&self) -> Result<ProgressMap, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard.iter().map(|(k, v)| (k.clone(), *v)).collect())
    }

    async fn save_progress(&self, key: &SessionKey, index: usize) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        guard.insert(key.clone(), index);
        Ok(())
    }
}

#[async_trait]
impl CompletionRepository for InMemoryRepository {
    async fn load_completed(&self) -> Result<CompletionMap, StorageError> {
        let guard = self.completed.lock().map_err(poisoned)?;
        Ok(guard.iter().cloned().collect())
    }

    async fn mark_completed(&self, title: &str) -> Result<(), StorageError> {
        let mut guard = self.completed.lock().map_err(poisoned)?;
        guard.insert(title.to_owned());
        Ok(())
    }

    async fn clear_completed(&self, title: &str) -> Result<(), StorageError> {
        let mut guard = self.completed.lock().map_err(poisoned)?;
        guard.remove(title);
        Ok(())
    }
}

/// Aggregates the three repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub answers: Arc<dyn AnswerRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub completion: Arc<dyn CompletionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repo(InMemoryRepository::new())
    }

    /// Share one backend across all three handles.
    #[must_use]
    pub fn from_repo<R>(repo: R) -> Self
    where
        R: AnswerRepository + ProgressRepository + CompletionRepository + Clone + 'static,
    {
        let answers: Arc<dyn AnswerRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let completion: Arc<dyn CompletionRepository> = Arc::new(repo);
        Self {
            answers,
            progress,
            completion,
        }
    }
}
