use quiz_core::model::{AnswerRecord, QuestionId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn index_to_i64(index: usize) -> Result<i64, StorageError> {
    i64::try_from(index).map_err(|_| StorageError::Serialization("index overflow".into()))
}

pub(crate) fn index_from_i64(v: i64) -> Result<usize, StorageError> {
    usize::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid index: {v}")))
}

pub(crate) fn map_answer_row(row: &SqliteRow) -> Result<AnswerRecord, StorageError> {
    let raw_id: String = row.try_get("question_id").map_err(ser)?;
    let question_id = QuestionId::from_persisted(raw_id);

    let wrong_count_i64: i64 = row.try_get("wrong_count").map_err(ser)?;
    let wrong_count = u32::try_from(wrong_count_i64).map_err(|_| {
        StorageError::Serialization(format!("invalid wrong_count: {wrong_count_i64}"))
    })?;

    Ok(AnswerRecord::from_persisted(
        question_id,
        row.try_get::<bool, _>("is_answered").map_err(ser)?,
        row.try_get::<bool, _>("is_correct").map_err(ser)?,
        row.try_get::<Option<String>, _>("selected_answer")
            .map_err(ser)?,
        row.try_get::<bool, _>("is_favorite").map_err(ser)?,
        wrong_count,
    ))
}
