#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use quiz_core::model::{
    FormattedText, GeneratedQuestion, Question, QuestionId, Quiz, QuizId, SubjectId, UserId,
};
use services::{GenerationContext, GeneratorError, QuestionGenerator};
use storage::repository::{QuizRepository, StorageError};

pub const MAX_POINTS: i32 = 3;

pub fn sid(name: &str) -> SubjectId {
    SubjectId::new(name).unwrap()
}

/// Numbered addition questions; numbering continues from the owner's history.
pub struct AdditionGenerator {
    subject: SubjectId,
}

impl AdditionGenerator {
    pub fn new(subject: &str) -> Arc<dyn QuestionGenerator> {
        Arc::new(Self {
            subject: sid(subject),
        })
    }
}

#[async_trait]
impl QuestionGenerator for AdditionGenerator {
    fn subject(&self) -> &SubjectId {
        &self.subject
    }

    async fn generate_questions(
        &self,
        context: &GenerationContext,
        owner: UserId,
        count: u32,
    ) -> Result<Vec<GeneratedQuestion>, GeneratorError> {
        let seen = context.previous_questions(owner, &self.subject).await?.len();
        Ok((0..count as usize)
            .map(|i| {
                let n = seen + i + 1;
                let mut dimensions = BTreeMap::new();
                dimensions.insert("operand".to_string(), n as f32);
                GeneratedQuestion {
                    prompt: FormattedText::plain(format!("{} #{n}: {n} + 1", self.subject)),
                    answer: FormattedText::plain("integer"),
                    answer_value: (n + 1).to_string(),
                    dimensions,
                    points: MAX_POINTS,
                }
            })
            .collect())
    }

    fn score(&self, question: &Question, submitted: &str) -> Result<i32, GeneratorError> {
        if question.subject() != &self.subject {
            return Err(GeneratorError::WrongSubject {
                expected: self.subject.clone(),
                actual: question.subject().clone(),
            });
        }
        if submitted.trim() == question.answer_value() {
            Ok(question.points())
        } else {
            Ok(0)
        }
    }
}

/// Always returns one question fewer than requested.
pub struct ShortGenerator {
    subject: SubjectId,
}

impl ShortGenerator {
    pub fn new(subject: &str) -> Arc<dyn QuestionGenerator> {
        Arc::new(Self {
            subject: sid(subject),
        })
    }
}

#[async_trait]
impl QuestionGenerator for ShortGenerator {
    fn subject(&self) -> &SubjectId {
        &self.subject
    }

    async fn generate_questions(
        &self,
        _context: &GenerationContext,
        _owner: UserId,
        count: u32,
    ) -> Result<Vec<GeneratedQuestion>, GeneratorError> {
        Ok((1..count)
            .map(|n| GeneratedQuestion {
                prompt: FormattedText::plain(format!("short {n}")),
                answer: FormattedText::plain("integer"),
                answer_value: n.to_string(),
                dimensions: BTreeMap::new(),
                points: 1,
            })
            .collect())
    }

    fn score(&self, _question: &Question, _submitted: &str) -> Result<i32, GeneratorError> {
        Ok(0)
    }
}

/// Emits questions whose single dimension weight is not a number.
pub struct NanWeightGenerator {
    subject: SubjectId,
}

impl NanWeightGenerator {
    pub fn new(subject: &str) -> Arc<dyn QuestionGenerator> {
        Arc::new(Self {
            subject: sid(subject),
        })
    }
}

#[async_trait]
impl QuestionGenerator for NanWeightGenerator {
    fn subject(&self) -> &SubjectId {
        &self.subject
    }

    async fn generate_questions(
        &self,
        _context: &GenerationContext,
        _owner: UserId,
        count: u32,
    ) -> Result<Vec<GeneratedQuestion>, GeneratorError> {
        Ok((0..count)
            .map(|n| GeneratedQuestion {
                prompt: FormattedText::plain(format!("weightless {n}")),
                answer: FormattedText::plain("integer"),
                answer_value: n.to_string(),
                dimensions: BTreeMap::from([("difficulty".to_string(), f32::NAN)]),
                points: 1,
            })
            .collect())
    }

    fn score(&self, _question: &Question, _submitted: &str) -> Result<i32, GeneratorError> {
        Ok(0)
    }
}

/// Counts writes before delegating to the wrapped repository.
pub struct RecordingQuizzes {
    inner: Arc<dyn QuizRepository>,
    pub saved_quizzes: AtomicUsize,
    pub saved_question_batches: AtomicUsize,
}

impl RecordingQuizzes {
    pub fn new(inner: Arc<dyn QuizRepository>) -> Self {
        Self {
            inner,
            saved_quizzes: AtomicUsize::new(0),
            saved_question_batches: AtomicUsize::new(0),
        }
    }

    pub fn writes(&self) -> usize {
        self.saved_quizzes.load(Ordering::SeqCst) + self.saved_question_batches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuizRepository for RecordingQuizzes {
    async fn save_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        self.saved_quizzes.fetch_add(1, Ordering::SeqCst);
        self.inner.save_quiz(quiz).await
    }

    async fn save_questions(
        &self,
        quiz_id: QuizId,
        ordered: &[Question],
    ) -> Result<(), StorageError> {
        self.saved_question_batches.fetch_add(1, Ordering::SeqCst);
        self.inner.save_questions(quiz_id, ordered).await
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError> {
        self.inner.get_quiz(id).await
    }

    async fn list_quizzes(&self, owner: UserId) -> Result<Vec<Quiz>, StorageError> {
        self.inner.list_quizzes(owner).await
    }

    async fn delete_quiz(&self, id: QuizId) -> Result<(), StorageError> {
        self.inner.delete_quiz(id).await
    }
}

pub fn question_ids(quiz: &Quiz) -> Vec<QuestionId> {
    quiz.questions().iter().map(Question::id).collect()
}
