use async_trait::async_trait;
use quiz_core::model::{AnswerBook, AnswerRecord, QuestionId};

use super::SqliteRepository;
use super::mapping::{conn, map_answer_row};
use crate::repository::{AnswerRepository, StorageError};

#[async_trait]
impl AnswerRepository for SqliteRepository {
    async fn load_answers(&self) -> Result<AnswerBook, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT question_id, is_answered, is_correct, selected_answer, is_favorite, wrong_count
                FROM user_answers
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut book = AnswerBook::new();
        for row in rows {
            book.insert(map_answer_row(&row)?);
        }
        Ok(book)
    }

    async fn upsert_answer(&self, record: &AnswerRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_answers (question_id, is_answered, is_correct, selected_answer, is_favorite, wrong_count, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, CURRENT_TIMESTAMP)
            ON CONFLICT(question_id) DO UPDATE SET
                is_answered = excluded.is_answered,
                is_correct = excluded.is_correct,
                selected_answer = excluded.selected_answer,
                is_favorite = excluded.is_favorite,
                wrong_count = excluded.wrong_count,
                updated_at = excluded.updated_at
            ",
        )
        .bind(record.question_id().as_str())
        .bind(record.is_answered())
        .bind(record.is_correct())
        .bind(record.selected_answer())
        .bind(record.is_favorite())
        .bind(i64::from(record.wrong_count()))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn clear_answers(&self, ids: &[QuestionId]) -> Result<(), StorageError> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(conn)?;
        for id in ids {
            sqlx::query("DELETE FROM user_answers WHERE question_id = ?1")
                .bind(id.as_str())
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }
        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
