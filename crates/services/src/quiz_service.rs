use std::sync::Arc;

use quiz_core::model::{Answer, AnswerId, Question, QuestionId, Quiz, QuizId, SubjectId, UserId};
use storage::repository::{AnswerRepository, QuestionRepository, QuizRepository};

use crate::error::QuizError;

/// Read access to generated quizzes and their answer history.
#[derive(Clone)]
pub struct QuizService {
    quizzes: Arc<dyn QuizRepository>,
    questions: Arc<dyn QuestionRepository>,
    answers: Arc<dyn AnswerRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        questions: Arc<dyn QuestionRepository>,
        answers: Arc<dyn AnswerRepository>,
    ) -> Self {
        Self {
            quizzes,
            questions,
            answers,
        }
    }

    /// Fetch a quiz with its questions in presentation order.
    ///
    /// Returns `Ok(None)` when the quiz does not exist.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if repository access fails.
    pub async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, QuizError> {
        Ok(self.quizzes.get_quiz(id).await?)
    }

    /// # Errors
    ///
    /// Returns `QuizError::Storage` if repository access fails.
    pub async fn list_quizzes(&self, owner: UserId) -> Result<Vec<Quiz>, QuizError> {
        Ok(self.quizzes.list_quizzes(owner).await?)
    }

    /// Delete a quiz along with its questions and answers.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotFound` if the quiz does not exist.
    pub async fn delete_quiz(&self, id: QuizId) -> Result<(), QuizError> {
        if self.quizzes.get_quiz(id).await?.is_none() {
            return Err(QuizError::not_found("quiz", id));
        }
        self.quizzes.delete_quiz(id).await?;
        tracing::info!(quiz = %id, "deleted quiz");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizError::Storage` if repository access fails.
    pub async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, QuizError> {
        Ok(self.questions.get_question(id).await?)
    }

    /// # Errors
    ///
    /// Returns `QuizError::Storage` if repository access fails.
    pub async fn quiz_questions(&self, quiz_id: QuizId) -> Result<Vec<Question>, QuizError> {
        Ok(self.questions.questions_for_quiz(quiz_id).await?)
    }

    /// Every question generated for `owner` in `subject`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if repository access fails.
    pub async fn owner_subject_questions(
        &self,
        owner: UserId,
        subject: &SubjectId,
    ) -> Result<Vec<Question>, QuizError> {
        Ok(self
            .questions
            .questions_for_owner_subject(owner, subject)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `QuizError::Storage` if repository access fails.
    pub async fn get_answer(&self, id: AnswerId) -> Result<Option<Answer>, QuizError> {
        Ok(self.answers.get_answer(id).await?)
    }

    /// Answer history for a question, ordered by `time_answered`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if repository access fails.
    pub async fn question_answers(&self, question_id: QuestionId) -> Result<Vec<Answer>, QuizError> {
        Ok(self.answers.answers_for_question(question_id).await?)
    }

    /// # Errors
    ///
    /// Returns `QuizError::Storage` if repository access fails.
    pub async fn latest_answer(&self, question_id: QuestionId) -> Result<Option<Answer>, QuizError> {
        Ok(self.answers.latest_answer(question_id).await?)
    }
}
