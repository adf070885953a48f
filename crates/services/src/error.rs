//! Shared error types for the services crate.

use std::num::ParseIntError;

use thiserror::Error;

use quiz_core::model::{DesignError, SubjectId, UserError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors raised by a `QuestionGenerator` while producing or scoring questions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GeneratorError {
    #[error("generator for {expected} cannot handle a {actual} question")]
    WrongSubject {
        expected: SubjectId,
        actual: SubjectId,
    },
    #[error("dimension {name} has non-finite weight {weight}")]
    NonFiniteDimension { name: String, weight: f32 },
    #[error("generator failed: {0}")]
    Failed(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by quiz generation, answer evaluation and the quiz queries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("invalid design: {0}")]
    InvalidDesign(#[from] DesignError),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("no generator registered for subject {0}")]
    UnknownSubject(SubjectId),
    #[error("generator for {subject} returned {returned} questions, expected {expected}")]
    GeneratorCountMismatch {
        subject: SubjectId,
        expected: u32,
        returned: usize,
    },
    #[error("generator for {subject} failed")]
    Generator {
        subject: SubjectId,
        #[source]
        source: GeneratorError,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl QuizError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Errors emitted by `UserService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UserServiceError {
    #[error(transparent)]
    User(#[from] UserError),
    #[error("user {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `GeneratorRegistry`.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("a generator is already registered for subject {0}")]
    DuplicateSubject(SubjectId),
}

/// Errors emitted while reading `ServicesConfig` from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid random seed {value:?}")]
    InvalidSeed {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// Errors emitted while bootstrapping `QuizServices`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
