use academy_core::locale::{Locale, LocalizedText};
use academy_core::model::{CompletionRecord, Question, QuestionId, Role};
use sqlx::Row;
use std::str::FromStr;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Parses a stored UUID column into a typed identifier.
pub(crate) fn parse_id<T: FromStr>(field: &'static str, raw: &str) -> Result<T, StorageError> {
    raw.parse::<T>()
        .map_err(|_| StorageError::Serialization(format!("invalid {field}: {raw}")))
}

/// Reads the `<field>`, `<field>_he`, `<field>_en` column triple into a
/// localized text value.
pub(crate) fn localized_from_row(
    row: &sqlx::sqlite::SqliteRow,
    field: &str,
) -> Result<LocalizedText, StorageError> {
    let base: Option<String> = row.try_get(field).map_err(ser)?;
    let he: Option<String> = row
        .try_get(format!("{field}_he").as_str())
        .map_err(ser)?;
    let en: Option<String> = row
        .try_get(format!("{field}_en").as_str())
        .map_err(ser)?;
    Ok(LocalizedText::from_parts(base, he, en))
}

pub(crate) fn locale_to_str(locale: Locale) -> &'static str {
    locale.code()
}

pub(crate) fn parse_locale(s: &str) -> Result<Locale, StorageError> {
    match s {
        "he" => Ok(Locale::He),
        "en" => Ok(Locale::En),
        _ => Err(StorageError::Serialization(format!("invalid language: {s}"))),
    }
}

/// Storage encoding for roles. This must stay consistent with `parse_role`.
pub(crate) fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::Learner => "learner",
        Role::Privileged => "privileged",
    }
}

pub(crate) fn parse_role(s: &str) -> Result<Role, StorageError> {
    match s {
        "learner" => Ok(Role::Learner),
        "privileged" => Ok(Role::Privileged),
        _ => Err(StorageError::Serialization(format!("invalid role: {s}"))),
    }
}

pub(crate) fn index_from_i64(field: &'static str, v: i64) -> Result<usize, StorageError> {
    usize::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn order_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn threshold_from_i64(v: i64) -> Result<u8, StorageError> {
    u8::try_from(v)
        .ok()
        .filter(|&t| t <= 100)
        .ok_or_else(|| StorageError::Serialization(format!("invalid pass_threshold: {v}")))
}

/// Option lists are stored as one JSON array of localized values per
/// question, mirroring the backend's JSON columns.
pub(crate) fn options_to_json(options: &[LocalizedText]) -> Result<String, StorageError> {
    serde_json::to_string(options).map_err(ser)
}

pub(crate) fn options_from_json(raw: &str) -> Result<Vec<LocalizedText>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_question_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<Question, StorageError> {
    let id: QuestionId = parse_id("question id", row.try_get::<String, _>("id").map_err(ser)?.as_str())?;
    let prompt = localized_from_row(row, "prompt")?;
    let options = options_from_json(row.try_get::<String, _>("options").map_err(ser)?.as_str())?;
    let correct_option =
        index_from_i64("correct_option", row.try_get::<i64, _>("correct_option").map_err(ser)?)?;

    Question::new(id, prompt, options, correct_option).map_err(ser)
}

pub(crate) fn map_completion_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<CompletionRecord, StorageError> {
    let learner_id =
        parse_id("learner_id", row.try_get::<String, _>("learner_id").map_err(ser)?.as_str())?;
    let lesson_id =
        parse_id("lesson_id", row.try_get::<String, _>("lesson_id").map_err(ser)?.as_str())?;
    let completed: bool = row.try_get("completed").map_err(ser)?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;

    Ok(CompletionRecord::from_persisted(
        learner_id,
        lesson_id,
        completed,
        completed_at,
    ))
}
