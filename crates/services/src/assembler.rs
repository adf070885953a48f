use std::sync::Arc;

use quiz_core::model::{DesignId, Question, QuestionId, Quiz, QuizId};
use quiz_core::{AllocationEngine, RandomSource, shuffle};
use storage::repository::{DesignRepository, QuestionRepository, QuizRepository};

use crate::Clock;
use crate::error::{GeneratorError, QuizError};
use crate::generator::GenerationContext;
use crate::registry::GeneratorRegistry;

/// Builds quizzes from designs.
///
/// Allocation, generation and shuffling all happen in memory. Nothing is
/// written until every subject's generator has delivered, so a failed run
/// leaves storage untouched.
#[derive(Clone)]
pub struct QuizAssembler {
    clock: Clock,
    random: Arc<dyn RandomSource>,
    engine: AllocationEngine,
    registry: Arc<GeneratorRegistry>,
    designs: Arc<dyn DesignRepository>,
    quizzes: Arc<dyn QuizRepository>,
    context: GenerationContext,
}

impl QuizAssembler {
    #[must_use]
    pub fn new(
        clock: Clock,
        random: Arc<dyn RandomSource>,
        registry: Arc<GeneratorRegistry>,
        designs: Arc<dyn DesignRepository>,
        quizzes: Arc<dyn QuizRepository>,
        questions: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            clock,
            engine: AllocationEngine::new(Arc::clone(&random)),
            random,
            registry,
            designs,
            quizzes,
            context: GenerationContext::new(questions),
        }
    }

    /// Generate, persist and return a new quiz for `design_id`.
    ///
    /// The returned questions are in presentation order, which is also the
    /// order they are stored in.
    ///
    /// # Errors
    ///
    /// - `QuizError::NotFound` if the design does not exist.
    /// - `QuizError::InvalidDesign` if the design cannot produce a quiz.
    /// - `QuizError::UnknownSubject` if a subject has no generator.
    /// - `QuizError::GeneratorCountMismatch` if a generator returns the wrong
    ///   number of questions.
    /// - `QuizError::Generator` if a generator fails or returns a non-finite
    ///   dimension weight.
    /// - `QuizError::Storage` if loading or persisting fails.
    pub async fn generate(&self, design_id: DesignId) -> Result<Quiz, QuizError> {
        let design = self
            .designs
            .get_design(design_id)
            .await?
            .ok_or_else(|| QuizError::not_found("design", design_id))?;

        let allocation = self.engine.allocate(&design)?;
        if allocation.shortfall() > 0 {
            tracing::warn!(
                design = %design_id,
                total = allocation.total(),
                allocated = allocation.allocated(),
                "subject maximums cap the quiz below its drawn length"
            );
        }

        let now = self.clock.now();
        let quiz_id = QuizId::generate();
        let owner = design.owner_id();
        let mut questions: Vec<Question> = Vec::with_capacity(allocation.allocated() as usize);

        for share in allocation.subjects().iter().filter(|s| s.count > 0) {
            let generator = self
                .registry
                .lookup(&share.subject)
                .ok_or_else(|| QuizError::UnknownSubject(share.subject.clone()))?;

            let generated = generator
                .generate_questions(&self.context, owner, share.count)
                .await
                .map_err(|source| QuizError::Generator {
                    subject: share.subject.clone(),
                    source,
                })?;
            if generated.len() != share.count as usize {
                return Err(QuizError::GeneratorCountMismatch {
                    subject: share.subject.clone(),
                    expected: share.count,
                    returned: generated.len(),
                });
            }

            // Non-finite weights cannot be stored and read back.
            if let Some((name, weight)) = generated
                .iter()
                .flat_map(|g| g.dimensions.iter())
                .find(|(_, w)| !w.is_finite())
            {
                return Err(QuizError::Generator {
                    subject: share.subject.clone(),
                    source: GeneratorError::NonFiniteDimension {
                        name: name.clone(),
                        weight: *weight,
                    },
                });
            }

            questions.extend(generated.into_iter().map(|g| {
                Question::from_generated(
                    QuestionId::generate(),
                    quiz_id,
                    share.subject.clone(),
                    g,
                    now,
                )
            }));
        }

        shuffle(self.random.as_ref(), &mut questions);
        let quiz = Quiz::new(quiz_id, owner, now).with_questions(questions);

        self.quizzes.save_quiz(&quiz).await?;
        self.quizzes
            .save_questions(quiz.id(), quiz.questions())
            .await?;

        tracing::info!(
            quiz = %quiz.id(),
            design = %design_id,
            questions = quiz.questions().len(),
            "generated quiz"
        );
        Ok(quiz)
    }
}
