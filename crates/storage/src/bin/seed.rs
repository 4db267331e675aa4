use std::fmt;

use academy_core::Locale;
use academy_core::locale::LocalizedText;
use academy_core::model::{
    Assessment, AssessmentId, Attachment, Course, CourseId, LearnerId, Lesson, LessonId, Module,
    ModuleId, Question, QuestionId, Role,
};
use chrono::Utc;
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("ACADEMY_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = args.next().ok_or(ArgsError::MissingValue { flag: "--db" })?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "-h" | "--help" => {
                    print_usage();
                    std::process::exit(0);
                }
                other => return Err(ArgsError::UnknownArg(other.to_owned())),
            }
        }

        Ok(Self { db_url })
    }
}

fn print_usage() {
    eprintln!("Usage: seed [--db <sqlite-url>]");
    eprintln!();
    eprintln!("Seeds a demo course catalog, demo learners, and profiles.");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  ACADEMY_DB_URL");
}

fn question(
    id: u128,
    he: &str,
    en: &str,
    correct: usize,
) -> Result<Question, Box<dyn std::error::Error>> {
    Ok(Question::new(
        QuestionId::from_u128(id),
        LocalizedText::translated(he, en),
        vec![
            LocalizedText::translated("תשובה א", "Answer A"),
            LocalizedText::translated("תשובה ב", "Answer B"),
            LocalizedText::translated("תשובה ג", "Answer C"),
        ],
        correct,
    )?)
}

fn demo_course() -> Result<Course, Box<dyn std::error::Error>> {
    let course_id = CourseId::from_u128(1);

    let lesson_one = Lesson::new(
        LessonId::from_u128(11),
        LocalizedText::translated("מבוא", "Introduction"),
        LocalizedText::translated("ברוכים הבאים לקורס.", "Welcome to the course."),
        0,
    )
    .with_video_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ")?
    .with_duration_label("08:30");

    let quiz_lesson_id = LessonId::from_u128(12);
    let quiz = Assessment::new(
        AssessmentId::from_u128(100),
        Attachment::Lesson(quiz_lesson_id),
        vec![
            question(101, "שאלה ראשונה?", "First question?", 0)?,
            question(102, "שאלה שניה?", "Second question?", 2)?,
        ],
    )?;
    let lesson_two = Lesson::new(
        quiz_lesson_id,
        LocalizedText::translated("יסודות", "Fundamentals"),
        LocalizedText::translated("השיעור המרכזי.", "The main lesson."),
        1,
    )
    .with_video_url("https://vimeo.com/148751763")?
    .with_duration_label("21:15")
    .with_quiz(quiz)?;

    let lesson_three = Lesson::new(
        LessonId::from_u128(21),
        LocalizedText::translated("סיכום", "Wrap-up"),
        LocalizedText::translated("חזרה על החומר.", "Reviewing the material."),
        0,
    )
    .with_duration_label("05:45");

    let pre_test = Assessment::with_threshold(
        AssessmentId::from_u128(200),
        Attachment::PreTest(course_id),
        vec![question(201, "שאלת סינון?", "Screening question?", 1)?],
        60,
    )?;

    let course = Course::new(
        course_id,
        LocalizedText::translated("קורס הדגמה", "Demo Course"),
        Utc::now(),
    )
    .with_description(LocalizedText::translated(
        "קורס לדוגמה עם חידון ומבחן קדם.",
        "A sample course with a quiz and a pre-test.",
    ))
    .with_language(Locale::He)
    .with_lesson_qa(true)
    .with_modules(vec![
        Module::new(
            ModuleId::from_u128(1),
            LocalizedText::translated("פרק ראשון", "Part One"),
            0,
        )
        .with_lessons(vec![lesson_one, lesson_two]),
        Module::new(
            ModuleId::from_u128(2),
            LocalizedText::translated("פרק שני", "Part Two"),
            1,
        )
        .with_lessons(vec![lesson_three]),
    ])
    .with_pre_test(pre_test)?;

    Ok(course)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;

    let course = demo_course()?;
    storage.courses.upsert_course(&course).await?;

    let learner = LearnerId::from_u128(1000);
    let reviewer = LearnerId::from_u128(1001);
    storage.profiles.upsert_profile(learner, Role::Learner).await?;
    storage
        .profiles
        .upsert_profile(reviewer, Role::Privileged)
        .await?;

    println!(
        "Seeded course {} ({} lessons), learner {learner}, reviewer {reviewer} into {}",
        course.id(),
        course.total_lessons(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
