use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::{QuestionId, QuizId, SubjectId};

/// A piece of question text tagged with the format it is written in
/// (for example `"text/plain"` or `"text/markdown"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedText {
    pub body: String,
    pub format: String,
}

impl FormattedText {
    #[must_use]
    pub fn new(body: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            format: format.into(),
        }
    }

    /// Plain text content.
    #[must_use]
    pub fn plain(body: impl Into<String>) -> Self {
        Self::new(body, "text/plain")
    }
}

/// Question payload produced by a generator, not yet bound to a quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub prompt: FormattedText,
    /// How the expected answer is presented to the learner (input hint).
    pub answer: FormattedText,
    /// Canonical value a submission is scored against.
    pub answer_value: String,
    /// Dimension name to weight, consumed by the generator when scoring.
    pub dimensions: BTreeMap<String, f32>,
    pub points: i32,
}

/// A question bound to exactly one quiz. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    id: QuestionId,
    quiz_id: QuizId,
    subject: SubjectId,
    prompt: FormattedText,
    answer: FormattedText,
    answer_value: String,
    dimensions: BTreeMap<String, f32>,
    points: i32,
    created_at: DateTime<Utc>,
}

impl Question {
    /// Binds a generated payload to a quiz, copying every payload field verbatim.
    #[must_use]
    pub fn from_generated(
        id: QuestionId,
        quiz_id: QuizId,
        subject: SubjectId,
        generated: GeneratedQuestion,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            quiz_id,
            subject,
            prompt: generated.prompt,
            answer: generated.answer,
            answer_value: generated.answer_value,
            dimensions: generated.dimensions,
            points: generated.points,
            created_at,
        }
    }

    /// Rehydrates a question from storage.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn from_persisted(
        id: QuestionId,
        quiz_id: QuizId,
        subject: SubjectId,
        prompt: FormattedText,
        answer: FormattedText,
        answer_value: String,
        dimensions: BTreeMap<String, f32>,
        points: i32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            quiz_id,
            subject,
            prompt,
            answer,
            answer_value,
            dimensions,
            points,
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    #[must_use]
    pub fn prompt(&self) -> &FormattedText {
        &self.prompt
    }

    #[must_use]
    pub fn answer(&self) -> &FormattedText {
        &self.answer
    }

    #[must_use]
    pub fn answer_value(&self) -> &str {
        &self.answer_value
    }

    #[must_use]
    pub fn dimensions(&self) -> &BTreeMap<String, f32> {
        &self.dimensions
    }

    #[must_use]
    pub fn points(&self) -> i32 {
        self.points
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
