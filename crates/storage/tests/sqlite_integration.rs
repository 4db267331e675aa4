use academy_core::Locale;
use academy_core::locale::LocalizedText;
use academy_core::model::{
    Assessment, AssessmentId, Attachment, CompletionRecord, Course, CourseId, LearnerId, Lesson,
    LessonId, Module, ModuleId, Question, QuestionId, Role,
};
use academy_core::time::fixed_now;
use storage::repository::{Storage, StorageError};
use storage::sqlite::SqliteRepository;

fn build_question(id: u128, correct: usize) -> Question {
    Question::new(
        QuestionId::from_u128(id),
        LocalizedText::plain("Prompt").with_locale(Locale::En, "Prompt EN"),
        vec![
            LocalizedText::translated("א", "A"),
            LocalizedText::translated("ב", "B"),
        ],
        correct,
    )
    .unwrap()
}

fn build_course() -> Course {
    let course_id = CourseId::from_u128(1);
    let lesson_id = LessonId::from_u128(11);
    let quiz = Assessment::with_threshold(
        AssessmentId::from_u128(100),
        Attachment::Lesson(lesson_id),
        vec![build_question(101, 0), build_question(102, 1)],
        70,
    )
    .unwrap();
    let lesson = Lesson::new(
        lesson_id,
        LocalizedText::translated("שיעור", "Lesson"),
        LocalizedText::plain("Body"),
        0,
    )
    .with_video_url("https://vimeo.com/148751763")
    .unwrap()
    .with_duration_label("10:00")
    .with_quiz(quiz)
    .unwrap();
    let plain_lesson = Lesson::new(
        LessonId::from_u128(12),
        LocalizedText::plain("Second"),
        LocalizedText::plain("Body 2"),
        1,
    );
    let module = Module::new(ModuleId::from_u128(10), LocalizedText::plain("Module"), 0)
        .with_lessons(vec![plain_lesson, lesson]);
    let pre_test = Assessment::new(
        AssessmentId::from_u128(200),
        Attachment::PreTest(course_id),
        vec![build_question(201, 1)],
    )
    .unwrap();

    Course::new(course_id, LocalizedText::plain("Course"), fixed_now())
        .with_description(LocalizedText::translated("תיאור", "Description"))
        .with_language(Locale::En)
        .with_lesson_qa(true)
        .with_modules(vec![module])
        .with_pre_test(pre_test)
        .unwrap()
}

#[tokio::test]
async fn course_aggregate_round_trips() {
    let storage = Storage::sqlite("sqlite:file:memdb_course_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");

    let course = build_course();
    storage.courses.upsert_course(&course).await.unwrap();

    let fetched = storage.courses.get_course(course.id()).await.unwrap();
    assert_eq!(fetched, course);

    // Lessons come back in display order regardless of insertion order.
    let ids = fetched.lesson_ids();
    assert_eq!(ids, vec![LessonId::from_u128(11), LessonId::from_u128(12)]);

    let listed = storage.courses.list_courses().await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn upsert_course_replaces_the_content_tree() {
    let storage = Storage::sqlite("sqlite:file:memdb_course_replace?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");

    let course = build_course();
    storage.courses.upsert_course(&course).await.unwrap();

    // Re-author the course down to a single lesson without a quiz.
    let slim = Course::new(course.id(), LocalizedText::plain("Course v2"), fixed_now())
        .with_modules(vec![
            Module::new(ModuleId::from_u128(10), LocalizedText::plain("Only"), 0).with_lessons(
                vec![Lesson::new(
                    LessonId::from_u128(11),
                    LocalizedText::plain("Lesson"),
                    LocalizedText::plain("Body"),
                    0,
                )],
            ),
        ]);
    storage.courses.upsert_course(&slim).await.unwrap();

    let fetched = storage.courses.get_course(course.id()).await.unwrap();
    assert_eq!(fetched.total_lessons(), 1);
    assert!(!fetched.has_pre_test());
    assert!(fetched.lesson(LessonId::from_u128(11)).unwrap().quiz().is_none());

    // The old quiz went away with its lesson.
    let err = storage
        .assessments
        .get_assessment(AssessmentId::from_u128(100))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn assessment_fetch_preserves_questions_and_threshold() {
    let storage = Storage::sqlite("sqlite:file:memdb_assessment_fetch?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");

    storage.courses.upsert_course(&build_course()).await.unwrap();

    let quiz = storage
        .assessments
        .get_assessment(AssessmentId::from_u128(100))
        .await
        .unwrap();
    assert_eq!(quiz.pass_threshold(), 70);
    assert_eq!(quiz.question_count(), 2);
    assert_eq!(quiz.questions()[0].correct_option(), 0);
    assert_eq!(quiz.questions()[0].prompt().resolve(Locale::En), "Prompt");
    assert_eq!(quiz.questions()[0].options()[1].resolve(Locale::En), "B");
    assert_eq!(quiz.lesson_id(), Some(LessonId::from_u128(11)));
}

#[tokio::test]
async fn question_less_assessment_is_treated_as_missing() {
    let storage =
        Storage::sqlite("sqlite:file:memdb_empty_assessment?mode=memory&cache=shared")
            .await
            .expect("connect sqlite");
    let repo =
        SqliteRepository::connect("sqlite:file:memdb_empty_assessment?mode=memory&cache=shared")
            .await
            .expect("connect raw");

    storage.courses.upsert_course(&build_course()).await.unwrap();

    // Simulate a data-entry accident: an assessment row with no questions.
    let empty_id = AssessmentId::from_u128(999);
    sqlx::query("INSERT INTO assessments (id, lesson_id, course_id, pass_threshold) VALUES (?1, ?2, NULL, 80)")
        .bind(empty_id.to_string())
        .bind(LessonId::from_u128(12).to_string())
        .execute(repo.pool())
        .await
        .unwrap();

    let err = storage.assessments.get_assessment(empty_id).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));

    // And the lesson hydrates as quiz-less rather than with a broken quiz.
    let course = storage.courses.get_course(CourseId::from_u128(1)).await.unwrap();
    assert!(course.lesson(LessonId::from_u128(12)).unwrap().quiz().is_none());
}

#[tokio::test]
async fn completion_upsert_collapses_duplicates() {
    let storage = Storage::sqlite("sqlite:file:memdb_completions?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");

    let learner = LearnerId::from_u128(7);
    let lesson = LessonId::from_u128(11);
    let record = CompletionRecord::completed_now(learner, lesson, fixed_now());

    storage.completions.upsert_completion(&record).await.unwrap();
    storage.completions.upsert_completion(&record).await.unwrap();

    let records = storage
        .completions
        .list_completions(learner, &[lesson, LessonId::from_u128(12)])
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].is_completed());
    assert_eq!(records[0].completed_at(), Some(fixed_now()));

    // Another learner sees nothing.
    let other = storage
        .completions
        .list_completions(LearnerId::from_u128(8), &[lesson])
        .await
        .unwrap();
    assert!(other.is_empty());
}

#[tokio::test]
async fn profile_roles_round_trip() {
    let storage = Storage::sqlite("sqlite:file:memdb_profiles?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");

    let learner = LearnerId::from_u128(1);
    storage.profiles.upsert_profile(learner, Role::Learner).await.unwrap();
    assert_eq!(storage.profiles.get_role(learner).await.unwrap(), Role::Learner);

    storage
        .profiles
        .upsert_profile(learner, Role::Privileged)
        .await
        .unwrap();
    assert_eq!(
        storage.profiles.get_role(learner).await.unwrap(),
        Role::Privileged
    );

    let err = storage
        .profiles
        .get_role(LearnerId::from_u128(404))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}
