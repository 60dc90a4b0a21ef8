use async_trait::async_trait;
use quiz_core::model::CompletionMap;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{CompletionRepository, StorageError};

#[async_trait]
impl CompletionRepository for SqliteRepository {
    async fn load_completed(&self) -> Result<CompletionMap, StorageError> {
        let rows = sqlx::query("SELECT title FROM completed_categories")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut completed = CompletionMap::new();
        for row in rows {
            completed.mark(row.try_get::<String, _>("title").map_err(ser)?);
        }
        Ok(completed)
    }

    async fn mark_completed(&self, title: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO completed_categories (title, completed_at)
            VALUES (?1, CURRENT_TIMESTAMP)
            ON CONFLICT(title) DO UPDATE SET completed_at = excluded.completed_at
            ",
        )
        .bind(title)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn clear_completed(&self, title: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM completed_categories WHERE title = ?1")
            .bind(title)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        Ok(())
    }
}
