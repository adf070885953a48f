use quiz_core::model::{Question, QuestionId, Quiz, QuizId, SubjectId, UserId};

use super::SqliteRepository;
use super::mapping::{db_err, dimensions_to_json, map_question_row, map_quiz_row};
use crate::repository::{QuestionRepository, QuizRepository, StorageError};

#[async_trait::async_trait]
impl QuizRepository for SqliteRepository {
    async fn save_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO quizzes (id, owner_id, created_at)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(quiz.id().to_string())
        .bind(quiz.owner_id().to_string())
        .bind(quiz.created_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn save_questions(
        &self,
        quiz_id: QuizId,
        ordered: &[Question],
    ) -> Result<(), StorageError> {
        if ordered.iter().any(|q| q.quiz_id() != quiz_id) {
            return Err(StorageError::Conflict);
        }

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let existing: Option<i64> = sqlx::query_scalar(
            r"
            SELECT (SELECT COUNT(*) FROM questions WHERE quiz_id = ?1)
            FROM quizzes WHERE id = ?1
            ",
        )
        .bind(quiz_id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;
        // Appending keeps ordinals unique when questions arrive in batches.
        let mut ordinal = existing.ok_or(StorageError::NotFound)?;

        for question in ordered {
            sqlx::query(
                r"
                INSERT INTO questions (
                    id, quiz_id, ordinal, subject, prompt, prompt_format,
                    answer, answer_format, answer_value, dimensions, points, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                ",
            )
            .bind(question.id().to_string())
            .bind(quiz_id.to_string())
            .bind(ordinal)
            .bind(question.subject().as_str())
            .bind(question.prompt().body.as_str())
            .bind(question.prompt().format.as_str())
            .bind(question.answer().body.as_str())
            .bind(question.answer().format.as_str())
            .bind(question.answer_value())
            .bind(dimensions_to_json(question.dimensions())?)
            .bind(i64::from(question.points()))
            .bind(question.created_at())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
            ordinal += 1;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError> {
        let row = sqlx::query("SELECT id, owner_id, created_at FROM quizzes WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let quiz = map_quiz_row(&row)?;
        let questions = self.questions_for_quiz(quiz.id()).await?;
        Ok(Some(quiz.with_questions(questions)))
    }

    async fn list_quizzes(&self, owner: UserId) -> Result<Vec<Quiz>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, owner_id, created_at
            FROM quizzes
            WHERE owner_id = ?1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut quizzes = Vec::with_capacity(rows.len());
        for row in rows {
            let quiz = map_quiz_row(&row)?;
            let questions = self.questions_for_quiz(quiz.id()).await?;
            quizzes.push(quiz.with_questions(questions));
        }
        Ok(quizzes)
    }

    async fn delete_quiz(&self, id: QuizId) -> Result<(), StorageError> {
        // Questions and answers go with it through ON DELETE CASCADE.
        sqlx::query("DELETE FROM quizzes WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, quiz_id, subject, prompt, prompt_format, answer, answer_format,
                   answer_value, dimensions, points, created_at
            FROM questions WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(map_question_row).transpose()
    }

    async fn questions_for_quiz(&self, quiz_id: QuizId) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, quiz_id, subject, prompt, prompt_format, answer, answer_format,
                   answer_value, dimensions, points, created_at
            FROM questions
            WHERE quiz_id = ?1
            ORDER BY ordinal ASC
            ",
        )
        .bind(quiz_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(map_question_row).collect()
    }

    async fn questions_for_owner_subject(
        &self,
        owner: UserId,
        subject: &SubjectId,
    ) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT q.id, q.quiz_id, q.subject, q.prompt, q.prompt_format, q.answer,
                   q.answer_format, q.answer_value, q.dimensions, q.points, q.created_at
            FROM questions q
            JOIN quizzes z ON z.id = q.quiz_id
            WHERE z.owner_id = ?1 AND q.subject = ?2
            ORDER BY q.created_at ASC, q.id ASC
            ",
        )
        .bind(owner.to_string())
        .bind(subject.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(map_question_row).collect()
    }
}
