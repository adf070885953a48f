use chrono::{DateTime, Utc};

use crate::model::ids::{QuizId, SubjectId, UserId};
use crate::model::question::Question;

/// A generated quiz. `questions` is in presentation order.
#[derive(Debug, Clone, PartialEq)]
pub struct Quiz {
    id: QuizId,
    owner_id: UserId,
    created_at: DateTime<Utc>,
    questions: Vec<Question>,
}

impl Quiz {
    /// Creates a quiz with no questions yet.
    #[must_use]
    pub fn new(id: QuizId, owner_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            owner_id,
            created_at,
            questions: Vec::new(),
        }
    }

    /// Replaces the question list, keeping the given order.
    #[must_use]
    pub fn with_questions(mut self, questions: Vec<Question>) -> Self {
        self.questions = questions;
        self
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions on the quiz for the given subject.
    #[must_use]
    pub fn subject_count(&self, subject: &SubjectId) -> usize {
        self.questions
            .iter()
            .filter(|q| q.subject() == subject)
            .count()
    }
}
