use academy_core::locale::{Locale, LocaleVisibility};
use academy_core::model::{Course, CourseId, Lesson, LessonId, Module, ModuleId};
use sqlx::Row;

use super::{
    SqliteRepository,
    assessment_repo::{insert_assessment, load_lesson_quiz, load_pre_test},
    mapping::{conn, localized_from_row, locale_to_str, order_from_i64, parse_id, parse_locale, ser},
};
use crate::repository::{CourseRepository, StorageError};

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
                INSERT INTO courses (
                    id, title, title_he, title_en,
                    description, description_he, description_en,
                    language, enable_lesson_qa, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    title_he = excluded.title_he,
                    title_en = excluded.title_en,
                    description = excluded.description,
                    description_he = excluded.description_he,
                    description_en = excluded.description_en,
                    language = excluded.language,
                    enable_lesson_qa = excluded.enable_lesson_qa,
                    created_at = excluded.created_at
            ",
        )
        .bind(course.id().to_string())
        .bind(course.title().base())
        .bind(course.title().variant(Locale::He))
        .bind(course.title().variant(Locale::En))
        .bind(course.description().base())
        .bind(course.description().variant(Locale::He))
        .bind(course.description().variant(Locale::En))
        .bind(course.language().map(locale_to_str))
        .bind(course.lesson_qa_enabled())
        .bind(course.created_at())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        // The admin editor always writes the whole aggregate, so the content
        // tree is replaced wholesale. Deletes cascade down to questions.
        sqlx::query("DELETE FROM modules WHERE course_id = ?1")
            .bind(course.id().to_string())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        sqlx::query("DELETE FROM assessments WHERE course_id = ?1")
            .bind(course.id().to_string())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for module in course.modules() {
            sqlx::query(
                r"
                    INSERT INTO modules (id, course_id, title, title_he, title_en, order_index)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )
            .bind(module.id().to_string())
            .bind(course.id().to_string())
            .bind(module.title().base())
            .bind(module.title().variant(Locale::He))
            .bind(module.title().variant(Locale::En))
            .bind(i64::from(module.order_index()))
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

            for lesson in module.lessons() {
                sqlx::query(
                    r"
                        INSERT INTO lessons (
                            id, module_id, title, title_he, title_en,
                            body, body_he, body_en,
                            video_url, duration_label, order_index
                        )
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                    ",
                )
                .bind(lesson.id().to_string())
                .bind(module.id().to_string())
                .bind(lesson.title().base())
                .bind(lesson.title().variant(Locale::He))
                .bind(lesson.title().variant(Locale::En))
                .bind(lesson.body().base())
                .bind(lesson.body().variant(Locale::He))
                .bind(lesson.body().variant(Locale::En))
                .bind(lesson.video_url().map(|u| u.as_str()))
                .bind(lesson.duration_label())
                .bind(i64::from(lesson.order_index()))
                .execute(&mut *tx)
                .await
                .map_err(conn)?;

                if let Some(quiz) = lesson.quiz() {
                    insert_assessment(&mut tx, quiz).await?;
                }
            }
        }

        if let Some(pre_test) = course.pre_test() {
            insert_assessment(&mut tx, pre_test).await?;
        }

        tx.commit().await.map_err(conn)
    }

    async fn get_course(&self, id: CourseId) -> Result<Course, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, title, title_he, title_en,
                       description, description_he, description_en,
                       language, enable_lesson_qa, created_at
                FROM courses
                WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        let mut course = Course::new(
            id,
            localized_from_row(&row, "title")?,
            row.try_get("created_at").map_err(ser)?,
        )
        .with_description(localized_from_row(&row, "description")?)
        .with_lesson_qa(row.try_get("enable_lesson_qa").map_err(ser)?);

        if let Some(language) = row.try_get::<Option<String>, _>("language").map_err(ser)? {
            course = course.with_language(parse_locale(&language)?);
        }

        let module_rows = sqlx::query(
            r"
                SELECT id, title, title_he, title_en, order_index
                FROM modules
                WHERE course_id = ?1
                ORDER BY order_index ASC, id ASC
            ",
        )
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut modules = Vec::with_capacity(module_rows.len());
        for module_row in module_rows {
            let module_id: ModuleId = parse_id(
                "module id",
                module_row.try_get::<String, _>("id").map_err(ser)?.as_str(),
            )?;
            let module = Module::new(
                module_id,
                localized_from_row(&module_row, "title")?,
                order_from_i64(
                    "order_index",
                    module_row.try_get::<i64, _>("order_index").map_err(ser)?,
                )?,
            );

            let lesson_rows = sqlx::query(
                r"
                    SELECT id, title, title_he, title_en,
                           body, body_he, body_en,
                           video_url, duration_label, order_index
                    FROM lessons
                    WHERE module_id = ?1
                    ORDER BY order_index ASC, id ASC
                ",
            )
            .bind(module_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

            let mut lessons = Vec::with_capacity(lesson_rows.len());
            for lesson_row in lesson_rows {
                lessons.push(self.map_lesson_row(&lesson_row).await?);
            }

            modules.push(module.with_lessons(lessons));
        }
        course = course.with_modules(modules);

        if let Some(pre_test) = load_pre_test(&self.pool, id).await? {
            course = course.with_pre_test(pre_test).map_err(ser)?;
        }

        Ok(course)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let rows = sqlx::query("SELECT id FROM courses ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut courses = Vec::with_capacity(rows.len());
        for row in rows {
            let id: CourseId =
                parse_id("course id", row.try_get::<String, _>("id").map_err(ser)?.as_str())?;
            courses.push(self.get_course(id).await?);
        }
        Ok(courses)
    }
}

impl SqliteRepository {
    async fn map_lesson_row(
        &self,
        row: &sqlx::sqlite::SqliteRow,
    ) -> Result<Lesson, StorageError> {
        let lesson_id: LessonId =
            parse_id("lesson id", row.try_get::<String, _>("id").map_err(ser)?.as_str())?;

        let mut lesson = Lesson::new(
            lesson_id,
            localized_from_row(row, "title")?,
            localized_from_row(row, "body")?,
            order_from_i64("order_index", row.try_get::<i64, _>("order_index").map_err(ser)?)?,
        );

        if let Some(video_url) = row.try_get::<Option<String>, _>("video_url").map_err(ser)? {
            lesson = lesson.with_video_url(&video_url).map_err(ser)?;
        }
        if let Some(duration) = row
            .try_get::<Option<String>, _>("duration_label")
            .map_err(ser)?
        {
            lesson = lesson.with_duration_label(duration);
        }
        if let Some(quiz) = load_lesson_quiz(&self.pool, lesson_id).await? {
            lesson = lesson.with_quiz(quiz).map_err(ser)?;
        }

        Ok(lesson)
    }
}
