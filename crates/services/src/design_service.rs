use std::sync::Arc;

use quiz_core::model::{DesignId, QuizDesign, QuizDesignSubject, UserId};
use storage::repository::DesignRepository;

use crate::Clock;
use crate::error::QuizError;

/// Validates and persists quiz designs.
#[derive(Clone)]
pub struct DesignService {
    clock: Clock,
    designs: Arc<dyn DesignRepository>,
}

impl DesignService {
    #[must_use]
    pub fn new(clock: Clock, designs: Arc<dyn DesignRepository>) -> Self {
        Self { clock, designs }
    }

    /// Create a design and persist it.
    ///
    /// The design must be able to produce a quiz: see [`QuizDesign::validate`].
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidDesign` for validation failures.
    /// Returns `QuizError::Storage` if persistence fails.
    pub async fn create_design(
        &self,
        owner: UserId,
        title: impl Into<String>,
        subjects: Vec<QuizDesignSubject>,
        min_questions: u32,
        max_questions: u32,
    ) -> Result<DesignId, QuizError> {
        let design = QuizDesign::new(
            DesignId::generate(),
            owner,
            title,
            subjects,
            min_questions,
            max_questions,
            self.clock.now(),
        )?;
        design.validate()?;
        self.designs.upsert_design(&design).await?;
        tracing::info!(design = %design.id(), owner = %owner, "created design");
        Ok(design.id())
    }

    /// Replace a stored design, keeping its original creation time.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidDesign` for validation failures,
    /// `QuizError::NotFound` if the design does not exist and
    /// `QuizError::Storage` if repository access fails.
    pub async fn update_design(&self, design: &QuizDesign) -> Result<(), QuizError> {
        design.validate()?;
        let existing = self
            .designs
            .get_design(design.id())
            .await?
            .ok_or_else(|| QuizError::not_found("design", design.id()))?;

        let updated = QuizDesign::new(
            design.id(),
            design.owner_id(),
            design.title(),
            design.subjects().to_vec(),
            design.min_questions(),
            design.max_questions(),
            existing.created_at(),
        )?;
        self.designs.upsert_design(&updated).await?;
        Ok(())
    }

    /// Returns `Ok(None)` when the design does not exist.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if repository access fails.
    pub async fn get_design(&self, id: DesignId) -> Result<Option<QuizDesign>, QuizError> {
        Ok(self.designs.get_design(id).await?)
    }

    /// An owner's designs, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if repository access fails.
    pub async fn list_designs(&self, owner: UserId) -> Result<Vec<QuizDesign>, QuizError> {
        Ok(self.designs.list_designs(owner).await?)
    }

    /// Quizzes already generated from the design are kept.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if repository access fails.
    pub async fn delete_design(&self, id: DesignId) -> Result<(), QuizError> {
        self.designs.delete_design(id).await?;
        Ok(())
    }
}
