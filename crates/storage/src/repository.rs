use async_trait::async_trait;
use quiz_core::model::{
    Answer, AnswerId, DesignId, Question, QuestionId, Quiz, QuizDesign, QuizId, SubjectId, User,
    UserId,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist or update a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the user cannot be stored.
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError>;

    /// Fetch a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError>;

    /// List every user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_users(&self) -> Result<Vec<User>, StorageError>;

    /// Delete a user. Deleting a missing user is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_user(&self, id: UserId) -> Result<(), StorageError>;
}

/// Repository contract for quiz designs.
#[async_trait]
pub trait DesignRepository: Send + Sync {
    /// Persist or update a design.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the design cannot be stored.
    async fn upsert_design(&self, design: &QuizDesign) -> Result<(), StorageError>;

    /// Fetch a design by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_design(&self, id: DesignId) -> Result<Option<QuizDesign>, StorageError>;

    /// List an owner's designs, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_designs(&self, owner: UserId) -> Result<Vec<QuizDesign>, StorageError>;

    /// Delete a design. Quizzes generated from it are kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_design(&self, id: DesignId) -> Result<(), StorageError>;
}

/// Repository contract for quizzes and their questions.
///
/// `save_quiz` and `save_questions` are each atomic, but the pair is not: a
/// failure between them leaves a quiz without questions.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Persist the quiz record itself; its questions are saved separately.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the quiz already exists.
    async fn save_quiz(&self, quiz: &Quiz) -> Result<(), StorageError>;

    /// Persist a quiz's questions. Each question's position in `ordered` is
    /// stored as its ordinal and reads return questions in that order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the quiz has not been saved, or
    /// `StorageError::Conflict` if a question belongs to another quiz.
    async fn save_questions(
        &self,
        quiz_id: QuizId,
        ordered: &[Question],
    ) -> Result<(), StorageError>;

    /// Fetch a quiz with its questions in stored order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError>;

    /// List an owner's quizzes (with questions), oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_quizzes(&self, owner: UserId) -> Result<Vec<Quiz>, StorageError>;

    /// Delete a quiz together with its questions and their answers.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_quiz(&self, id: QuizId) -> Result<(), StorageError>;
}

/// Read access to individual questions.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError>;

    /// Questions of a quiz in stored order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn questions_for_quiz(&self, quiz_id: QuizId) -> Result<Vec<Question>, StorageError>;

    /// Every question on the owner's quizzes for one subject, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn questions_for_owner_subject(
        &self,
        owner: UserId,
        subject: &SubjectId,
    ) -> Result<Vec<Question>, StorageError>;
}

/// Repository contract for answers.
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the question does not exist.
    async fn save_answer(&self, answer: &Answer) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_answer(&self, id: AnswerId) -> Result<Option<Answer>, StorageError>;

    /// All answers for a question ordered by `time_answered`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn answers_for_question(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<Answer>, StorageError>;

    /// The answer with the greatest `time_answered`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn latest_answer(&self, question_id: QuestionId) -> Result<Option<Answer>, StorageError> {
        let answers = self.answers_for_question(question_id).await?;
        Ok(quiz_core::model::latest_answer(&answers).cloned())
    }
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

struct QuizEntry {
    quiz: Quiz,
    question_ids: Vec<QuestionId>,
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    designs: HashMap<DesignId, QuizDesign>,
    quizzes: HashMap<QuizId, QuizEntry>,
    questions: HashMap<QuestionId, Question>,
    answers: HashMap<AnswerId, Answer>,
}

impl MemoryState {
    fn quiz_with_questions(&self, entry: &QuizEntry) -> Quiz {
        let questions = entry
            .question_ids
            .iter()
            .filter_map(|id| self.questions.get(id).cloned())
            .collect();
        entry.quiz.clone().with_questions(questions)
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// All aggregates share one lock, so multi-entity operations such as
/// `delete_quiz` are atomic.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        self.lock()?.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let mut users: Vec<User> = self.lock()?.users.values().cloned().collect();
        users.sort_by_key(|u| (u.created_at(), u.id()));
        Ok(users)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StorageError> {
        self.lock()?.users.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl DesignRepository for InMemoryRepository {
    async fn upsert_design(&self, design: &QuizDesign) -> Result<(), StorageError> {
        self.lock()?.designs.insert(design.id(), design.clone());
        Ok(())
    }

    async fn get_design(&self, id: DesignId) -> Result<Option<QuizDesign>, StorageError> {
        Ok(self.lock()?.designs.get(&id).cloned())
    }

    async fn list_designs(&self, owner: UserId) -> Result<Vec<QuizDesign>, StorageError> {
        let mut designs: Vec<QuizDesign> = self
            .lock()?
            .designs
            .values()
            .filter(|d| d.owner_id() == owner)
            .cloned()
            .collect();
        designs.sort_by_key(|d| (d.created_at(), d.id()));
        Ok(designs)
    }

    async fn delete_design(&self, id: DesignId) -> Result<(), StorageError> {
        self.lock()?.designs.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn save_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if guard.quizzes.contains_key(&quiz.id()) {
            return Err(StorageError::Conflict);
        }
        let header = Quiz::new(quiz.id(), quiz.owner_id(), quiz.created_at());
        guard.quizzes.insert(
            quiz.id(),
            QuizEntry {
                quiz: header,
                question_ids: Vec::new(),
            },
        );
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
        let mut guard = self.lock()?;
        let state = &mut *guard;
        let entry = state
            .quizzes
            .get_mut(&quiz_id)
            .ok_or(StorageError::NotFound)?;
        let mut incoming = HashSet::with_capacity(ordered.len());
        if ordered
            .iter()
            .any(|q| state.questions.contains_key(&q.id()) || !incoming.insert(q.id()))
        {
            return Err(StorageError::Conflict);
        }
        for question in ordered {
            entry.question_ids.push(question.id());
            state.questions.insert(question.id(), question.clone());
        }
        Ok(())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .quizzes
            .get(&id)
            .map(|entry| guard.quiz_with_questions(entry)))
    }

    async fn list_quizzes(&self, owner: UserId) -> Result<Vec<Quiz>, StorageError> {
        let guard = self.lock()?;
        let mut quizzes: Vec<Quiz> = guard
            .quizzes
            .values()
            .filter(|entry| entry.quiz.owner_id() == owner)
            .map(|entry| guard.quiz_with_questions(entry))
            .collect();
        quizzes.sort_by_key(|q| (q.created_at(), q.id()));
        Ok(quizzes)
    }

    async fn delete_quiz(&self, id: QuizId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let Some(entry) = guard.quizzes.remove(&id) else {
            return Ok(());
        };
        for question_id in &entry.question_ids {
            guard.questions.remove(question_id);
        }
        guard
            .answers
            .retain(|_, a| !entry.question_ids.contains(&a.question_id));
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        Ok(self.lock()?.questions.get(&id).cloned())
    }

    async fn questions_for_quiz(&self, quiz_id: QuizId) -> Result<Vec<Question>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .quizzes
            .get(&quiz_id)
            .map(|entry| guard.quiz_with_questions(entry).questions().to_vec())
            .unwrap_or_default())
    }

    async fn questions_for_owner_subject(
        &self,
        owner: UserId,
        subject: &SubjectId,
    ) -> Result<Vec<Question>, StorageError> {
        let guard = self.lock()?;
        let mut found: Vec<Question> = guard
            .quizzes
            .values()
            .filter(|entry| entry.quiz.owner_id() == owner)
            .flat_map(|entry| entry.question_ids.iter())
            .filter_map(|id| guard.questions.get(id))
            .filter(|q| q.subject() == subject)
            .cloned()
            .collect();
        found.sort_by_key(|q| (q.created_at(), q.id()));
        Ok(found)
    }
}

#[async_trait]
impl AnswerRepository for InMemoryRepository {
    async fn save_answer(&self, answer: &Answer) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.questions.contains_key(&answer.question_id) {
            return Err(StorageError::NotFound);
        }
        guard.answers.insert(answer.id, answer.clone());
        Ok(())
    }

    async fn get_answer(&self, id: AnswerId) -> Result<Option<Answer>, StorageError> {
        Ok(self.lock()?.answers.get(&id).cloned())
    }

    async fn answers_for_question(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<Answer>, StorageError> {
        let mut answers: Vec<Answer> = self
            .lock()?
            .answers
            .values()
            .filter(|a| a.question_id == question_id)
            .cloned()
            .collect();
        answers.sort_by_key(|a| (a.time_answered, a.id));
        Ok(answers)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub designs: Arc<dyn DesignRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub answers: Arc<dyn AnswerRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Uses one repository value for every aggregate.
    pub(crate) fn from_repository<R>(repo: R) -> Self
    where
        R: UserRepository
            + DesignRepository
            + QuizRepository
            + QuestionRepository
            + AnswerRepository
            + Clone
            + 'static,
    {
        Self {
            users: Arc::new(repo.clone()),
            designs: Arc::new(repo.clone()),
            quizzes: Arc::new(repo.clone()),
            questions: Arc::new(repo.clone()),
            answers: Arc::new(repo),
        }
    }
}
