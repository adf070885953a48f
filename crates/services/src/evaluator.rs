use std::sync::Arc;

use chrono::{DateTime, Utc};
use quiz_core::model::{Answer, AnswerId, Question, QuestionId};
use storage::repository::{AnswerRepository, QuestionRepository};

use crate::Clock;
use crate::error::QuizError;
use crate::registry::GeneratorRegistry;

/// Scores submitted answers through the subject's generator and records them.
#[derive(Clone)]
pub struct AnswerEvaluator {
    clock: Clock,
    registry: Arc<GeneratorRegistry>,
    questions: Arc<dyn QuestionRepository>,
    answers: Arc<dyn AnswerRepository>,
}

impl AnswerEvaluator {
    #[must_use]
    pub fn new(
        clock: Clock,
        registry: Arc<GeneratorRegistry>,
        questions: Arc<dyn QuestionRepository>,
        answers: Arc<dyn AnswerRepository>,
    ) -> Self {
        Self {
            clock,
            registry,
            questions,
            answers,
        }
    }

    /// Score `submitted` for `question`, then persist and return the answer.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownSubject` if no generator handles the
    /// question's subject, `QuizError::Generator` if scoring fails and
    /// `QuizError::Storage` if the answer cannot be saved.
    pub async fn evaluate(
        &self,
        question: &Question,
        submitted: &str,
        time_asked: DateTime<Utc>,
    ) -> Result<Answer, QuizError> {
        let subject = question.subject();
        let generator = self
            .registry
            .lookup(subject)
            .ok_or_else(|| QuizError::UnknownSubject(subject.clone()))?;

        let points = generator
            .score(question, submitted)
            .map_err(|source| QuizError::Generator {
                subject: subject.clone(),
                source,
            })?;

        let answer = Answer {
            id: AnswerId::generate(),
            question_id: question.id(),
            value: submitted.to_owned(),
            points,
            time_asked,
            time_answered: self.clock.now(),
        };
        self.answers.save_answer(&answer).await?;

        tracing::debug!(
            question = %question.id(),
            subject = %subject,
            points,
            "scored answer"
        );
        Ok(answer)
    }

    /// Load the question by ID, then [`evaluate`](Self::evaluate) it.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotFound` if the question does not exist, otherwise
    /// the errors of `evaluate`.
    pub async fn answer_question(
        &self,
        question_id: QuestionId,
        submitted: &str,
        time_asked: DateTime<Utc>,
    ) -> Result<Answer, QuizError> {
        let question = self
            .questions
            .get_question(question_id)
            .await?
            .ok_or_else(|| QuizError::not_found("question", question_id))?;
        self.evaluate(&question, submitted, time_asked).await
    }
}
