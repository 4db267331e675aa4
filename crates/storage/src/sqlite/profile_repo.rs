use academy_core::model::{LearnerId, Role};
use sqlx::Row;

use super::{
    SqliteRepository,
    mapping::{conn, parse_role, role_to_str, ser},
};
use crate::repository::{ProfileRepository, StorageError};

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn upsert_profile(&self, learner_id: LearnerId, role: Role) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO profiles (learner_id, role)
                VALUES (?1, ?2)
                ON CONFLICT(learner_id) DO UPDATE SET role = excluded.role
            ",
        )
        .bind(learner_id.to_string())
        .bind(role_to_str(role))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_role(&self, learner_id: LearnerId) -> Result<Role, StorageError> {
        let row = sqlx::query("SELECT role FROM profiles WHERE learner_id = ?1")
            .bind(learner_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;

        parse_role(row.try_get::<String, _>("role").map_err(ser)?.as_str())
    }
}
