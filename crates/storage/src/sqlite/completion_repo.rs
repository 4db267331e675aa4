use academy_core::model::{CompletionRecord, LearnerId, LessonId};

use super::{
    SqliteRepository,
    mapping::{conn, map_completion_row},
};
use crate::repository::{CompletionRepository, StorageError};

#[async_trait::async_trait]
impl CompletionRepository for SqliteRepository {
    async fn upsert_completion(&self, record: &CompletionRecord) -> Result<(), StorageError> {
        // The composite primary key makes this safe under concurrent
        // duplicate calls: both writers land on the same row.
        sqlx::query(
            r"
                INSERT INTO completion_records (learner_id, lesson_id, completed, completed_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(learner_id, lesson_id) DO UPDATE SET
                    completed = excluded.completed,
                    completed_at = excluded.completed_at
            ",
        )
        .bind(record.learner_id().to_string())
        .bind(record.lesson_id().to_string())
        .bind(record.is_completed())
        .bind(record.completed_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn list_completions(
        &self,
        learner_id: LearnerId,
        lesson_ids: &[LessonId],
    ) -> Result<Vec<CompletionRecord>, StorageError> {
        if lesson_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            r"
                SELECT learner_id, lesson_id, completed, completed_at
                FROM completion_records
                WHERE learner_id = ?1 AND lesson_id IN (
            ",
        );
        for i in 0..lesson_ids.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('?');
            sql.push_str(&(i + 2).to_string());
        }
        sql.push(')');

        let mut query = sqlx::query(&sql).bind(learner_id.to_string());
        for lesson_id in lesson_ids {
            query = query.bind(lesson_id.to_string());
        }

        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(map_completion_row(&row)?);
        }
        Ok(records)
    }
}
