#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    AnswerRepository, DesignRepository, InMemoryRepository, QuestionRepository, QuizRepository,
    Storage, StorageError, UserRepository,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
