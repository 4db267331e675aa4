use academy_core::model::{
    Assessment, AssessmentId, Attachment, CourseId, LessonId, Question,
};
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::{
    SqliteRepository,
    mapping::{conn, map_question_row, options_to_json, parse_id, ser, threshold_from_i64},
};
use crate::repository::{AssessmentRepository, StorageError};

pub(crate) async fn load_questions(
    pool: &SqlitePool,
    assessment_id: &str,
) -> Result<Vec<Question>, StorageError> {
    let rows = sqlx::query(
        r"
            SELECT id, prompt, prompt_he, prompt_en, options, correct_option
            FROM questions
            WHERE assessment_id = ?1
            ORDER BY order_index ASC, id ASC
        ",
    )
    .bind(assessment_id)
    .fetch_all(pool)
    .await
    .map_err(conn)?;

    let mut questions = Vec::with_capacity(rows.len());
    for row in rows {
        questions.push(map_question_row(&row)?);
    }
    Ok(questions)
}

/// Builds the domain assessment from its row and questions.
///
/// Returns `None` when no questions exist: a question-less assessment must
/// never reach the quiz flow, so it is dropped at hydration.
fn build_assessment(
    row: &sqlx::sqlite::SqliteRow,
    questions: Vec<Question>,
) -> Result<Option<Assessment>, StorageError> {
    if questions.is_empty() {
        return Ok(None);
    }

    let id: AssessmentId = parse_id(
        "assessment id",
        row.try_get::<String, _>("id").map_err(ser)?.as_str(),
    )?;
    let lesson_id: Option<String> = row.try_get("lesson_id").map_err(ser)?;
    let course_id: Option<String> = row.try_get("course_id").map_err(ser)?;
    let attachment = match (lesson_id, course_id) {
        (Some(lesson), None) => Attachment::Lesson(parse_id::<LessonId>("lesson_id", &lesson)?),
        (None, Some(course)) => Attachment::PreTest(parse_id::<CourseId>("course_id", &course)?),
        _ => {
            return Err(StorageError::Serialization(
                "assessment must attach to exactly one of lesson or course".into(),
            ));
        }
    };
    let pass_threshold =
        threshold_from_i64(row.try_get::<i64, _>("pass_threshold").map_err(ser)?)?;

    Assessment::with_threshold(id, attachment, questions, pass_threshold)
        .map(Some)
        .map_err(ser)
}

async fn load_by_filter(
    pool: &SqlitePool,
    filter_column: &'static str,
    id: &str,
) -> Result<Option<Assessment>, StorageError> {
    let sql = format!(
        "SELECT id, lesson_id, course_id, pass_threshold FROM assessments WHERE {filter_column} = ?1"
    );
    let Some(row) = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(conn)?
    else {
        return Ok(None);
    };

    let assessment_id: String = row.try_get("id").map_err(ser)?;
    let questions = load_questions(pool, &assessment_id).await?;
    build_assessment(&row, questions)
}

/// The lesson's quiz, if one exists and has questions.
pub(crate) async fn load_lesson_quiz(
    pool: &SqlitePool,
    lesson_id: LessonId,
) -> Result<Option<Assessment>, StorageError> {
    load_by_filter(pool, "lesson_id", &lesson_id.to_string()).await
}

/// The course's pre-test, if one exists and has questions.
pub(crate) async fn load_pre_test(
    pool: &SqlitePool,
    course_id: CourseId,
) -> Result<Option<Assessment>, StorageError> {
    load_by_filter(pool, "course_id", &course_id.to_string()).await
}

/// Inserts an assessment and its questions inside the caller's transaction.
pub(crate) async fn insert_assessment(
    tx: &mut SqliteConnection,
    assessment: &Assessment,
) -> Result<(), StorageError> {
    let (lesson_id, course_id) = match assessment.attachment() {
        Attachment::Lesson(id) => (Some(id.to_string()), None),
        Attachment::PreTest(id) => (None, Some(id.to_string())),
    };

    sqlx::query(
        r"
            INSERT INTO assessments (id, lesson_id, course_id, pass_threshold)
            VALUES (?1, ?2, ?3, ?4)
        ",
    )
    .bind(assessment.id().to_string())
    .bind(lesson_id)
    .bind(course_id)
    .bind(i64::from(assessment.pass_threshold()))
    .execute(&mut *tx)
    .await
    .map_err(conn)?;

    for (position, question) in assessment.questions().iter().enumerate() {
        let order = i64::try_from(position).map_err(ser)?;
        sqlx::query(
            r"
                INSERT INTO questions (
                    id, assessment_id, prompt, prompt_he, prompt_en,
                    options, correct_option, order_index
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(question.id().to_string())
        .bind(assessment.id().to_string())
        .bind(question.prompt().base())
        .bind(question.prompt().variant(academy_core::Locale::He))
        .bind(question.prompt().variant(academy_core::Locale::En))
        .bind(options_to_json(question.options())?)
        .bind(i64::try_from(question.correct_option()).map_err(ser)?)
        .bind(order)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;
    }

    Ok(())
}

#[async_trait::async_trait]
impl AssessmentRepository for SqliteRepository {
    async fn get_assessment(&self, id: AssessmentId) -> Result<Assessment, StorageError> {
        let Some(row) = sqlx::query(
            r"
                SELECT id, lesson_id, course_id, pass_threshold
                FROM assessments
                WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        else {
            return Err(StorageError::NotFound);
        };

        let questions = load_questions(&self.pool, &id.to_string()).await?;
        build_assessment(&row, questions)?.ok_or(StorageError::NotFound)
    }
}
