#![forbid(unsafe_code)]

pub mod assembler;
pub mod config;
pub mod design_service;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod quiz_service;
pub mod quiz_services;
pub mod registry;
pub mod user_service;

pub use quiz_core::Clock;

pub use assembler::QuizAssembler;
pub use config::ServicesConfig;
pub use design_service::DesignService;
pub use error::{
    ConfigError, GeneratorError, QuizError, QuizServicesError, RegistryError, UserServiceError,
};
pub use evaluator::AnswerEvaluator;
pub use generator::{GenerationContext, QuestionGenerator};
pub use quiz_service::QuizService;
pub use quiz_services::QuizServices;
pub use registry::GeneratorRegistry;
pub use user_service::UserService;
