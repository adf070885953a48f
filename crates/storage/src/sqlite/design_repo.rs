use quiz_core::model::{DesignId, QuizDesign, UserId};

use super::SqliteRepository;
use super::mapping::{db_err, map_design_row, subjects_to_json};
use crate::repository::{DesignRepository, StorageError};

#[async_trait::async_trait]
impl DesignRepository for SqliteRepository {
    async fn upsert_design(&self, design: &QuizDesign) -> Result<(), StorageError> {
        let subjects = subjects_to_json(design.subjects())?;

        sqlx::query(
            r"
            INSERT INTO quiz_designs (id, owner_id, title, subjects, min_questions, max_questions, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                -- created_at is kept from the original insert
                owner_id = excluded.owner_id,
                title = excluded.title,
                subjects = excluded.subjects,
                min_questions = excluded.min_questions,
                max_questions = excluded.max_questions
            ",
        )
        .bind(design.id().to_string())
        .bind(design.owner_id().to_string())
        .bind(design.title())
        .bind(subjects)
        .bind(i64::from(design.min_questions()))
        .bind(i64::from(design.max_questions()))
        .bind(design.created_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_design(&self, id: DesignId) -> Result<Option<QuizDesign>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, owner_id, title, subjects, min_questions, max_questions, created_at
            FROM quiz_designs WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(map_design_row).transpose()
    }

    async fn list_designs(&self, owner: UserId) -> Result<Vec<QuizDesign>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, owner_id, title, subjects, min_questions, max_questions, created_at
            FROM quiz_designs
            WHERE owner_id = ?1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(map_design_row).collect()
    }

    async fn delete_design(&self, id: DesignId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM quiz_designs WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
