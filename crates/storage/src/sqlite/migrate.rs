use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the catalog tree (courses, modules, lessons), assessments with
/// their questions, per-learner completion records, and profiles.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS courses (
                    id TEXT PRIMARY KEY,
                    title TEXT,
                    title_he TEXT,
                    title_en TEXT,
                    description TEXT,
                    description_he TEXT,
                    description_en TEXT,
                    language TEXT CHECK (language IN ('he', 'en')),
                    enable_lesson_qa INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS modules (
                    id TEXT PRIMARY KEY,
                    course_id TEXT NOT NULL,
                    title TEXT,
                    title_he TEXT,
                    title_en TEXT,
                    order_index INTEGER NOT NULL CHECK (order_index >= 0),
                    FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS lessons (
                    id TEXT PRIMARY KEY,
                    module_id TEXT NOT NULL,
                    title TEXT,
                    title_he TEXT,
                    title_en TEXT,
                    body TEXT,
                    body_he TEXT,
                    body_en TEXT,
                    video_url TEXT,
                    duration_label TEXT,
                    order_index INTEGER NOT NULL CHECK (order_index >= 0),
                    FOREIGN KEY (module_id) REFERENCES modules(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        // Exactly one of lesson_id / course_id is set: a lesson quiz or a
        // course pre-test.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS assessments (
                    id TEXT PRIMARY KEY,
                    lesson_id TEXT,
                    course_id TEXT,
                    pass_threshold INTEGER NOT NULL
                        CHECK (pass_threshold BETWEEN 0 AND 100),
                    CHECK ((lesson_id IS NULL) <> (course_id IS NULL)),
                    FOREIGN KEY (lesson_id) REFERENCES lessons(id) ON DELETE CASCADE,
                    FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS questions (
                    id TEXT PRIMARY KEY,
                    assessment_id TEXT NOT NULL,
                    prompt TEXT,
                    prompt_he TEXT,
                    prompt_en TEXT,
                    options TEXT NOT NULL,
                    correct_option INTEGER NOT NULL CHECK (correct_option >= 0),
                    order_index INTEGER NOT NULL CHECK (order_index >= 0),
                    FOREIGN KEY (assessment_id) REFERENCES assessments(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        // Composite primary key gives the upsert its at-most-one-record
        // guarantee per (learner, lesson).
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS completion_records (
                    learner_id TEXT NOT NULL,
                    lesson_id TEXT NOT NULL,
                    completed INTEGER NOT NULL DEFAULT 0,
                    completed_at TEXT,
                    PRIMARY KEY (learner_id, lesson_id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS profiles (
                    learner_id TEXT PRIMARY KEY,
                    role TEXT NOT NULL CHECK (role IN ('learner', 'privileged'))
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_modules_course_order
                    ON modules(course_id, order_index);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_lessons_module_order
                    ON lessons(module_id, order_index);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_questions_assessment_order
                    ON questions(assessment_id, order_index);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_assessments_lesson
                    ON assessments(lesson_id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_assessments_course
                    ON assessments(course_id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
