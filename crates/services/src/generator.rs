//! The per-subject question generation capability.
//!
//! A generator produces questions for exactly one subject and scores answers
//! to the questions it produced. How a generator builds its content is its own
//! business; the services only rely on the contract below.

use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{GeneratedQuestion, Question, SubjectId, UserId};
use storage::repository::QuestionRepository;

use crate::error::GeneratorError;

/// Question generation and scoring for one subject.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// The subject this generator is registered under.
    fn subject(&self) -> &SubjectId;

    /// Produce exactly `count` questions for `owner`.
    ///
    /// Returning any other number of questions is a contract violation and
    /// aborts quiz generation.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError` if the questions cannot be produced.
    async fn generate_questions(
        &self,
        context: &GenerationContext,
        owner: UserId,
        count: u32,
    ) -> Result<Vec<GeneratedQuestion>, GeneratorError>;

    /// Points awarded for `submitted` as an answer to `question`.
    ///
    /// Must be pure with respect to its inputs.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError` if the answer cannot be scored.
    fn score(&self, question: &Question, submitted: &str) -> Result<i32, GeneratorError>;
}

/// Read-only view of stored questions handed to generators.
#[derive(Clone)]
pub struct GenerationContext {
    questions: Arc<dyn QuestionRepository>,
}

impl GenerationContext {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionRepository>) -> Self {
        Self { questions }
    }

    /// Questions previously generated for `owner` in `subject`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError::Storage` if the lookup fails.
    pub async fn previous_questions(
        &self,
        owner: UserId,
        subject: &SubjectId,
    ) -> Result<Vec<Question>, GeneratorError> {
        let questions = self
            .questions
            .questions_for_owner_subject(owner, subject)
            .await?;
        Ok(questions)
    }
}
