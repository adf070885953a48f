use std::sync::Arc;

use quiz_core::RandomSource;
use storage::repository::Storage;

use crate::Clock;
use crate::assembler::QuizAssembler;
use crate::config::ServicesConfig;
use crate::design_service::DesignService;
use crate::error::QuizServicesError;
use crate::evaluator::AnswerEvaluator;
use crate::quiz_service::QuizService;
use crate::registry::GeneratorRegistry;
use crate::user_service::UserService;

/// Every quiz-facing service wired to one storage backend and registry.
#[derive(Clone)]
pub struct QuizServices {
    registry: Arc<GeneratorRegistry>,
    users: Arc<UserService>,
    designs: Arc<DesignService>,
    assembler: Arc<QuizAssembler>,
    evaluator: Arc<AnswerEvaluator>,
    quizzes: Arc<QuizService>,
}

impl QuizServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `QuizServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        config: &ServicesConfig,
        clock: Clock,
        registry: Arc<GeneratorRegistry>,
    ) -> Result<Self, QuizServicesError> {
        let storage = Storage::sqlite(&config.database_url).await?;
        Ok(Self::from_storage(
            &storage,
            clock,
            config.random_source(),
            registry,
        ))
    }

    /// Build services backed by in-memory storage.
    #[must_use]
    pub fn in_memory(
        clock: Clock,
        random: Arc<dyn RandomSource>,
        registry: Arc<GeneratorRegistry>,
    ) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, random, registry)
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        random: Arc<dyn RandomSource>,
        registry: Arc<GeneratorRegistry>,
    ) -> Self {
        let users = Arc::new(UserService::new(clock, Arc::clone(&storage.users)));
        let designs = Arc::new(DesignService::new(clock, Arc::clone(&storage.designs)));
        let assembler = Arc::new(QuizAssembler::new(
            clock,
            random,
            Arc::clone(&registry),
            Arc::clone(&storage.designs),
            Arc::clone(&storage.quizzes),
            Arc::clone(&storage.questions),
        ));
        let evaluator = Arc::new(AnswerEvaluator::new(
            clock,
            Arc::clone(&registry),
            Arc::clone(&storage.questions),
            Arc::clone(&storage.answers),
        ));
        let quizzes = Arc::new(QuizService::new(
            Arc::clone(&storage.quizzes),
            Arc::clone(&storage.questions),
            Arc::clone(&storage.answers),
        ));

        Self {
            registry,
            users,
            designs,
            assembler,
            evaluator,
            quizzes,
        }
    }

    #[must_use]
    pub fn registry(&self) -> Arc<GeneratorRegistry> {
        Arc::clone(&self.registry)
    }

    #[must_use]
    pub fn users(&self) -> Arc<UserService> {
        Arc::clone(&self.users)
    }

    #[must_use]
    pub fn designs(&self) -> Arc<DesignService> {
        Arc::clone(&self.designs)
    }

    #[must_use]
    pub fn assembler(&self) -> Arc<QuizAssembler> {
        Arc::clone(&self.assembler)
    }

    #[must_use]
    pub fn evaluator(&self) -> Arc<AnswerEvaluator> {
        Arc::clone(&self.evaluator)
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizService> {
        Arc::clone(&self.quizzes)
    }
}
