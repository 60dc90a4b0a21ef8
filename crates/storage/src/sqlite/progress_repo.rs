use async_trait::async_trait;
use quiz_core::model::{ProgressMap, SessionKey};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, index_from_i64, index_to_i64, ser};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_progress(&self) -> Result<ProgressMap, StorageError> {
        let rows = sqlx::query("SELECT session_key, question_index FROM quiz_progress")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut progress = ProgressMap::new();
        for row in rows {
            let key: String = row.try_get("session_key").map_err(ser)?;
            let index: i64 = row.try_get("question_index").map_err(ser)?;
            progress.set(SessionKey::from_raw(key), index_from_i64(index)?);
        }
        Ok(progress)
    }

    async fn save_progress(&self, key: &SessionKey, index: usize) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO quiz_progress (session_key, question_index, updated_at)
            VALUES (?1, ?2, CURRENT_TIMESTAMP)
            ON CONFLICT(session_key) DO UPDATE SET
                question_index = excluded.question_index,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key.as_str())
        .bind(index_to_i64(index)?)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
