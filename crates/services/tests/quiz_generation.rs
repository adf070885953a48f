mod support;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use quiz_core::model::{DesignId, QuestionId, QuizDesignSubject, UserId};
use quiz_core::time::fixed_now;
use quiz_core::{RandomSource, SeededRandom};
use services::{
    AnswerEvaluator, Clock, DesignService, GeneratorError, GeneratorRegistry, QuizAssembler,
    QuizError, QuizService,
};
use storage::repository::{InMemoryRepository, QuizRepository};

use support::{
    AdditionGenerator, MAX_POINTS, NanWeightGenerator, RecordingQuizzes, ShortGenerator, sid,
};

struct Harness {
    registry: Arc<GeneratorRegistry>,
    recorder: Arc<RecordingQuizzes>,
    designs: DesignService,
    assembler: QuizAssembler,
    evaluator: AnswerEvaluator,
    queries: QuizService,
    owner: UserId,
}

fn harness(seed: u64) -> Harness {
    let repo = InMemoryRepository::new();
    let clock = Clock::fixed(fixed_now());
    let random: Arc<dyn RandomSource> = Arc::new(SeededRandom::new(seed));
    let registry = Arc::new(GeneratorRegistry::new());
    let recorder = Arc::new(RecordingQuizzes::new(Arc::new(repo.clone())));

    Harness {
        registry: Arc::clone(&registry),
        recorder: Arc::clone(&recorder),
        designs: DesignService::new(clock, Arc::new(repo.clone())),
        assembler: QuizAssembler::new(
            clock,
            random,
            Arc::clone(&registry),
            Arc::new(repo.clone()),
            recorder,
            Arc::new(repo.clone()),
        ),
        evaluator: AnswerEvaluator::new(
            clock,
            registry,
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        ),
        queries: QuizService::new(
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        ),
        owner: UserId::generate(),
    }
}

fn subject(name: &str, min: u32, max: u32) -> QuizDesignSubject {
    QuizDesignSubject::new(sid(name), min, max).unwrap()
}

impl Harness {
    async fn design(&self, subjects: Vec<QuizDesignSubject>, min: u32, max: u32) -> DesignId {
        self.designs
            .create_design(self.owner, "Practice", subjects, min, max)
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn single_subject_design_yields_exact_count() {
    let h = harness(1);
    h.registry.register(AdditionGenerator::new("add")).unwrap();
    // The subject's own range is not applied when it is the only subject.
    let design = h.design(vec![subject("add", 0, 1)], 5, 5).await;

    let quiz = h.assembler.generate(design).await.unwrap();

    assert_eq!(quiz.questions().len(), 5);
    assert_eq!(quiz.subject_count(&sid("add")), 5);
    assert_eq!(quiz.owner_id(), h.owner);
    assert!(quiz.questions().iter().all(|q| q.quiz_id() == quiz.id()));
}

#[tokio::test]
async fn two_subject_design_respects_every_range() {
    for seed in 0..40 {
        let h = harness(seed);
        h.registry.register(AdditionGenerator::new("x")).unwrap();
        h.registry.register(AdditionGenerator::new("y")).unwrap();
        let design = h
            .design(vec![subject("x", 1, 3), subject("y", 2, 2)], 3, 5)
            .await;

        let quiz = h.assembler.generate(design).await.unwrap();

        assert_eq!(quiz.subject_count(&sid("y")), 2);
        assert!((1..=3).contains(&quiz.subject_count(&sid("x"))));
        assert!((3..=5).contains(&quiz.questions().len()));
    }
}

#[tokio::test]
async fn unknown_subject_persists_nothing() {
    let h = harness(2);
    h.registry.register(AdditionGenerator::new("add")).unwrap();
    let design = h
        .design(vec![subject("add", 1, 1), subject("geo", 1, 1)], 2, 2)
        .await;

    let err = h.assembler.generate(design).await.unwrap_err();

    assert!(matches!(err, QuizError::UnknownSubject(ref s) if s == &sid("geo")));
    assert_eq!(h.recorder.writes(), 0);
    assert!(h.queries.list_quizzes(h.owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn short_generator_aborts_generation() {
    let h = harness(3);
    h.registry.register(ShortGenerator::new("short")).unwrap();
    let design = h.design(vec![subject("short", 3, 3)], 3, 3).await;

    let err = h.assembler.generate(design).await.unwrap_err();

    assert!(matches!(
        err,
        QuizError::GeneratorCountMismatch {
            expected: 3,
            returned: 2,
            ..
        }
    ));
    assert_eq!(h.recorder.writes(), 0);
    assert!(h.queries.list_quizzes(h.owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn non_finite_weights_abort_generation() {
    let h = harness(12);
    h.registry.register(AdditionGenerator::new("add")).unwrap();
    h.registry.register(NanWeightGenerator::new("odd")).unwrap();
    let design = h
        .design(vec![subject("add", 1, 1), subject("odd", 1, 1)], 2, 2)
        .await;

    let err = h.assembler.generate(design).await.unwrap_err();

    assert!(matches!(
        err,
        QuizError::Generator {
            source: GeneratorError::NonFiniteDimension { ref name, .. },
            ..
        } if name == "difficulty"
    ));
    assert_eq!(h.recorder.writes(), 0);
    assert!(h.queries.list_quizzes(h.owner).await.unwrap().is_empty());

    // The owner's history stays readable for later runs.
    h.registry.unregister(&sid("odd")).unwrap();
    h.registry.register(AdditionGenerator::new("odd")).unwrap();
    assert_eq!(h.assembler.generate(design).await.unwrap().questions().len(), 2);
}

#[tokio::test]
async fn exhausted_slots_yield_a_shorter_quiz() {
    let h = harness(13);
    h.registry.register(AdditionGenerator::new("x")).unwrap();
    h.registry.register(AdditionGenerator::new("y")).unwrap();
    // The total is fixed at 6 but the subjects can hold at most 3.
    let design = h
        .design(vec![subject("x", 0, 1), subject("y", 1, 2)], 6, 6)
        .await;

    let quiz = h.assembler.generate(design).await.unwrap();

    assert_eq!(quiz.questions().len(), 3);
    assert_eq!(quiz.subject_count(&sid("x")), 1);
    assert_eq!(quiz.subject_count(&sid("y")), 2);
    let stored = h.queries.get_quiz(quiz.id()).await.unwrap().unwrap();
    assert_eq!(stored.questions(), quiz.questions());
}

#[tokio::test]
async fn missing_design_is_not_found() {
    let h = harness(4);
    let err = h.assembler.generate(DesignId::generate()).await.unwrap_err();
    assert!(matches!(err, QuizError::NotFound { entity: "design", .. }));
}

#[tokio::test]
async fn stored_order_matches_presentation_order() {
    let h = harness(5);
    h.registry.register(AdditionGenerator::new("a")).unwrap();
    h.registry.register(AdditionGenerator::new("b")).unwrap();
    let design = h
        .design(vec![subject("a", 3, 3), subject("b", 3, 3)], 6, 6)
        .await;

    let quiz = h.assembler.generate(design).await.unwrap();
    let stored = h.queries.get_quiz(quiz.id()).await.unwrap().unwrap();

    assert_eq!(stored.questions(), quiz.questions());
    assert_eq!(
        h.queries.quiz_questions(quiz.id()).await.unwrap(),
        quiz.questions()
    );
    assert_eq!(h.recorder.writes(), 2);
}

#[tokio::test]
async fn shuffle_keeps_questions_and_varies_order() {
    let mut orders = HashSet::new();
    for seed in 0..30 {
        let h = harness(seed);
        h.registry.register(AdditionGenerator::new("a")).unwrap();
        h.registry.register(AdditionGenerator::new("b")).unwrap();
        let design = h
            .design(vec![subject("a", 2, 2), subject("b", 2, 2)], 4, 4)
            .await;

        let quiz = h.assembler.generate(design).await.unwrap();

        let mut prompts: Vec<String> = quiz
            .questions()
            .iter()
            .map(|q| q.prompt().body.clone())
            .collect();
        orders.insert(prompts.clone());
        prompts.sort();
        assert_eq!(
            prompts,
            ["a #1: 1 + 1", "a #2: 2 + 1", "b #1: 1 + 1", "b #2: 2 + 1"]
        );
    }
    assert!(orders.len() > 1, "shuffle never changed the order");
}

#[tokio::test]
async fn generators_see_previous_questions() {
    let h = harness(6);
    h.registry.register(AdditionGenerator::new("add")).unwrap();
    let design = h.design(vec![subject("add", 1, 3)], 3, 3).await;

    h.assembler.generate(design).await.unwrap();
    let second = h.assembler.generate(design).await.unwrap();

    let mut values: Vec<i32> = second
        .questions()
        .iter()
        .map(|q| q.answer_value().parse().unwrap())
        .collect();
    values.sort_unstable();
    assert_eq!(values, [5, 6, 7]);
    assert_eq!(h.queries.list_quizzes(h.owner).await.unwrap().len(), 2);
    assert_eq!(
        h.queries
            .owner_subject_questions(h.owner, &sid("add"))
            .await
            .unwrap()
            .len(),
        6
    );
}

#[tokio::test]
async fn correct_answers_earn_generator_points() {
    let h = harness(7);
    h.registry.register(AdditionGenerator::new("add")).unwrap();
    let design = h.design(vec![subject("add", 1, 1)], 1, 1).await;
    let quiz = h.assembler.generate(design).await.unwrap();
    let question = &quiz.questions()[0];
    let asked = fixed_now() - Duration::seconds(30);

    let right = h
        .evaluator
        .evaluate(question, question.answer_value(), asked)
        .await
        .unwrap();
    let wrong = h.evaluator.evaluate(question, "-1", asked).await.unwrap();

    assert_eq!(right.points, MAX_POINTS);
    assert!(wrong.points < right.points);
    assert_eq!(right.time_asked, asked);
    assert_eq!(right.time_answered, fixed_now());
    assert_eq!(
        h.queries.question_answers(question.id()).await.unwrap().len(),
        2
    );
    assert_eq!(h.queries.get_answer(wrong.id).await.unwrap(), Some(wrong));
}

#[tokio::test]
async fn scoring_is_idempotent() {
    let h = harness(8);
    h.registry.register(AdditionGenerator::new("add")).unwrap();
    let design = h.design(vec![subject("add", 1, 1)], 1, 1).await;
    let question = h.assembler.generate(design).await.unwrap().questions()[0].clone();

    let repo = InMemoryRepository::new();
    repo.save_quiz(&quiz_core::model::Quiz::new(
        question.quiz_id(),
        h.owner,
        fixed_now(),
    ))
    .await
    .unwrap();
    repo.save_questions(question.quiz_id(), std::slice::from_ref(&question))
        .await
        .unwrap();
    let evaluator = AnswerEvaluator::new(
        Clock::System,
        h.registry.clone(),
        Arc::new(repo.clone()),
        Arc::new(repo),
    );

    let first = evaluator.evaluate(&question, "7", fixed_now()).await.unwrap();
    let second = evaluator.evaluate(&question, "7", fixed_now()).await.unwrap();

    assert_eq!(first.points, second.points);
    assert_ne!(first.id, second.id);
    assert!(second.time_answered >= first.time_answered);
}

#[tokio::test]
async fn answer_question_loads_by_id() {
    let h = harness(9);
    h.registry.register(AdditionGenerator::new("add")).unwrap();
    let design = h.design(vec![subject("add", 1, 1)], 1, 1).await;
    let quiz = h.assembler.generate(design).await.unwrap();
    let question = &quiz.questions()[0];

    let answer = h
        .evaluator
        .answer_question(question.id(), question.answer_value(), fixed_now())
        .await
        .unwrap();
    assert_eq!(answer.points, MAX_POINTS);
    assert_eq!(
        h.queries.latest_answer(question.id()).await.unwrap(),
        Some(answer)
    );

    let err = h
        .evaluator
        .answer_question(QuestionId::generate(), "1", fixed_now())
        .await
        .unwrap_err();
    assert!(matches!(err, QuizError::NotFound { entity: "question", .. }));
}

#[tokio::test]
async fn unregistered_subject_cannot_be_scored() {
    let h = harness(10);
    h.registry.register(AdditionGenerator::new("add")).unwrap();
    let design = h.design(vec![subject("add", 1, 1)], 1, 1).await;
    let quiz = h.assembler.generate(design).await.unwrap();

    h.registry.unregister(&sid("add")).unwrap();
    let err = h
        .evaluator
        .evaluate(&quiz.questions()[0], "2", fixed_now())
        .await
        .unwrap_err();
    assert!(matches!(err, QuizError::UnknownSubject(_)));
}

#[tokio::test]
async fn delete_quiz_removes_answers() {
    let h = harness(11);
    h.registry.register(AdditionGenerator::new("add")).unwrap();
    let design = h.design(vec![subject("add", 2, 2)], 2, 2).await;
    let quiz = h.assembler.generate(design).await.unwrap();
    let question = &quiz.questions()[0];
    let answer = h
        .evaluator
        .evaluate(question, "0", fixed_now())
        .await
        .unwrap();

    h.queries.delete_quiz(quiz.id()).await.unwrap();

    assert!(h.queries.get_quiz(quiz.id()).await.unwrap().is_none());
    assert!(h.queries.get_question(question.id()).await.unwrap().is_none());
    assert!(h.queries.get_answer(answer.id).await.unwrap().is_none());
    assert!(matches!(
        h.queries.delete_quiz(quiz.id()).await.unwrap_err(),
        QuizError::NotFound { entity: "quiz", .. }
    ));
}
