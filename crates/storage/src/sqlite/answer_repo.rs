use quiz_core::model::{Answer, AnswerId, QuestionId};

use super::SqliteRepository;
use super::mapping::{db_err, map_answer_row};
use crate::repository::{AnswerRepository, StorageError};

#[async_trait::async_trait]
impl AnswerRepository for SqliteRepository {
    async fn save_answer(&self, answer: &Answer) -> Result<(), StorageError> {
        // A missing question trips the foreign key and maps to NotFound.
        sqlx::query(
            r"
            INSERT INTO answers (id, question_id, value, points, time_asked, time_answered)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(answer.id.to_string())
        .bind(answer.question_id.to_string())
        .bind(answer.value.as_str())
        .bind(i64::from(answer.points))
        .bind(answer.time_asked)
        .bind(answer.time_answered)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_answer(&self, id: AnswerId) -> Result<Option<Answer>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, question_id, value, points, time_asked, time_answered
            FROM answers WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(map_answer_row).transpose()
    }

    async fn answers_for_question(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<Answer>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, question_id, value, points, time_asked, time_answered
            FROM answers
            WHERE question_id = ?1
            ORDER BY time_answered ASC, id ASC
            ",
        )
        .bind(question_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(map_answer_row).collect()
    }
}
