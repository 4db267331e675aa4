use academy_core::locale::LocalizedText;
use academy_core::model::{
    Assessment, AssessmentId, Attachment, Course, CourseId, LearnerId, Lesson, LessonId, Module,
    ModuleId, Question, QuestionId, Role,
};
use academy_core::time::{fixed_clock, fixed_now};
use services::{Advance, AppServices, ProgressError};
use storage::repository::Storage;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}

fn question(id: u128, correct: usize) -> Question {
    Question::new(
        QuestionId::from_u128(id),
        LocalizedText::plain(format!("Q{id}")),
        vec![
            LocalizedText::plain("a"),
            LocalizedText::plain("b"),
            LocalizedText::plain("c"),
        ],
        correct,
    )
    .unwrap()
}

const PRE_TEST_ID: u128 = 200;
const QUIZ_ID: u128 = 100;
const OPEN_LESSON: u128 = 11;
const GATED_LESSON: u128 = 12;

fn build_course() -> Course {
    let course_id = CourseId::from_u128(1);
    let open_lesson = Lesson::new(
        LessonId::from_u128(OPEN_LESSON),
        LocalizedText::plain("Open"),
        LocalizedText::plain("body"),
        0,
    );
    let gated_id = LessonId::from_u128(GATED_LESSON);
    let quiz = Assessment::new(
        AssessmentId::from_u128(QUIZ_ID),
        Attachment::Lesson(gated_id),
        vec![question(101, 1), question(102, 0)],
    )
    .unwrap();
    let gated_lesson = Lesson::new(
        gated_id,
        LocalizedText::plain("Gated"),
        LocalizedText::plain("body"),
        1,
    )
    .with_quiz(quiz)
    .unwrap();
    let pre_test = Assessment::new(
        AssessmentId::from_u128(PRE_TEST_ID),
        Attachment::PreTest(course_id),
        vec![question(201, 1)],
    )
    .unwrap();

    Course::new(course_id, LocalizedText::plain("Course"), fixed_now())
        .with_modules(vec![
            Module::new(ModuleId::from_u128(1), LocalizedText::plain("M"), 0)
                .with_lessons(vec![open_lesson, gated_lesson]),
        ])
        .with_pre_test(pre_test)
        .unwrap()
}

async fn seeded_services() -> (AppServices, Course, LearnerId) {
    let storage = Storage::in_memory();
    let services = AppServices::with_storage(fixed_clock(), &storage);

    let course = build_course();
    services.catalog.save_course(&course).await.unwrap();

    let learner = LearnerId::from_u128(1000);
    storage.profiles.upsert_profile(learner, Role::Learner).await.unwrap();
    storage
        .profiles
        .upsert_profile(LearnerId::from_u128(1001), Role::Privileged)
        .await
        .unwrap();

    (services, course, learner)
}

#[tokio::test]
async fn pre_test_gates_the_course_until_passed() {
    init_tracing();
    let (services, course, learner) = seeded_services().await;
    let context = services.session.sign_in(learner).await;
    assert!(!context.is_privileged());

    assert!(!services.assessments.is_course_unlocked(&course, context.is_privileged()));

    // Fail the pre-test first.
    let mut attempt = services
        .assessments
        .open(AssessmentId::from_u128(PRE_TEST_ID))
        .await
        .unwrap();
    attempt.select_answer(0);
    let Advance::Completed(result) = attempt.advance() else {
        panic!("expected completion");
    };
    assert!(!result.passed());
    services.assessments.submit(&attempt);
    assert!(!services.assessments.is_course_unlocked(&course, false));

    // Retry and pass.
    assert!(attempt.retry());
    attempt.select_answer(1);
    let Advance::Completed(result) = attempt.advance() else {
        panic!("expected completion");
    };
    assert_eq!(result.score(), 100);
    assert!(result.passed());
    services.assessments.submit(&attempt);
    assert!(services.assessments.is_course_unlocked(&course, false));

    // A privileged reviewer never needed the pre-test.
    assert!({
        let reviewer = services.session.sign_in(LearnerId::from_u128(1001)).await;
        services.assessments.is_course_unlocked(&course, reviewer.is_privileged())
    });
}

#[tokio::test]
async fn lesson_quiz_gates_finishing_and_unlocks_on_pass() {
    init_tracing();
    let (services, course, learner) = seeded_services().await;
    services.session.sign_in(learner).await;
    services.progress.refresh(learner, &course).await.unwrap();

    let open_lesson = course.lesson(LessonId::from_u128(OPEN_LESSON)).unwrap();
    let gated_lesson = course.lesson(LessonId::from_u128(GATED_LESSON)).unwrap();
    let quiz_id = AssessmentId::from_u128(QUIZ_ID);

    // A lesson without a quiz is unlocked with no records and no results.
    assert!(services.progress.is_lesson_unlocked(open_lesson, None, false));
    assert!(!services.progress.is_lesson_unlocked(gated_lesson, None, false));

    // Finishing the gated lesson before passing its quiz is rejected.
    let err = services
        .progress
        .mark_lesson_complete(learner, gated_lesson, None, false)
        .await
        .unwrap_err();
    assert!(matches!(err, ProgressError::LessonLocked));

    // Fail the quiz: still locked.
    let mut attempt = services.assessments.open(quiz_id).await.unwrap();
    attempt.select_answer(0);
    attempt.advance();
    attempt.select_answer(0);
    let Advance::Completed(result) = attempt.advance() else {
        panic!("expected completion");
    };
    assert_eq!(result.score(), 50);
    assert!(!result.passed());
    services.assessments.submit(&attempt);
    let latest = services.assessments.latest_result(quiz_id);
    assert!(!services.progress.can_finish(gated_lesson, latest.as_ref(), false));

    // Retry, pass, finish.
    attempt.retry();
    attempt.select_answer(1);
    attempt.advance();
    attempt.select_answer(0);
    let Advance::Completed(result) = attempt.advance() else {
        panic!("expected completion");
    };
    assert_eq!(result.score(), 100);
    services.assessments.submit(&attempt);
    let latest = services.assessments.latest_result(quiz_id);
    assert!(services.progress.can_finish(gated_lesson, latest.as_ref(), false));

    services
        .progress
        .mark_lesson_complete(learner, gated_lesson, latest.as_ref(), false)
        .await
        .unwrap();
    assert!(services.progress.is_lesson_completed(gated_lesson.id()));

    // The open lesson finishes without any quiz involvement.
    services
        .progress
        .mark_lesson_complete(learner, open_lesson, None, false)
        .await
        .unwrap();

    let progress = services.progress.course_progress(&course);
    assert_eq!(progress.completed_lessons, 2);
    assert_eq!(progress.percent, 100);
    assert!(progress.is_complete);

    let stats = services
        .progress
        .dashboard_stats(learner, std::slice::from_ref(&course))
        .await
        .unwrap();
    assert_eq!(stats.overall_percent, 100);
    assert_eq!(stats.completed_courses, 1);
}

#[tokio::test]
async fn finishing_a_finished_lesson_stays_idempotent() {
    init_tracing();
    let (services, course, learner) = seeded_services().await;
    services.progress.refresh(learner, &course).await.unwrap();

    let open_lesson = course.lesson(LessonId::from_u128(OPEN_LESSON)).unwrap();
    services
        .progress
        .mark_lesson_complete(learner, open_lesson, None, false)
        .await
        .unwrap();
    services
        .progress
        .mark_lesson_complete(learner, open_lesson, None, false)
        .await
        .unwrap();

    let records = services.progress.records();
    let matching: Vec<_> = records
        .iter()
        .filter(|r| r.lesson_id() == open_lesson.id())
        .collect();
    assert_eq!(matching.len(), 1);
}

#[tokio::test]
async fn privileged_role_bypasses_the_lesson_quiz() {
    init_tracing();
    let (services, course, _learner) = seeded_services().await;
    let reviewer = LearnerId::from_u128(1001);
    let context = services.session.sign_in(reviewer).await;
    assert!(context.is_privileged());

    services.progress.refresh(reviewer, &course).await.unwrap();
    let gated_lesson = course.lesson(LessonId::from_u128(GATED_LESSON)).unwrap();

    assert!(services
        .progress
        .is_lesson_unlocked(gated_lesson, None, context.is_privileged()));
    services
        .progress
        .mark_lesson_complete(reviewer, gated_lesson, None, context.is_privileged())
        .await
        .unwrap();
    assert!(services.progress.is_lesson_completed(gated_lesson.id()));
}

#[tokio::test]
async fn missing_assessment_presents_as_unavailable() {
    init_tracing();
    let (services, _course, _learner) = seeded_services().await;
    let err = services
        .assessments
        .open(AssessmentId::from_u128(999))
        .await
        .unwrap_err();
    assert!(matches!(err, services::AssessmentFlowError::Unavailable(_)));
}
