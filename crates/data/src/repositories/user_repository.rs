//! User repository keyed by chat platform id.

use crate::error::StoreError;
use chrono::Utc;
use claim_tracker_domain::entities::{User, UserId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: UserId(row.try_get("id")?),
        platform_id: row.try_get("platform_id")?,
        display_name: row.try_get("display_name")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Repository for user records.
#[derive(Clone)]
pub struct UserRepository {
    pool: Arc<SqlitePool>,
}

impl UserRepository {
    /// Creates a new UserRepository.
    #[must_use]
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Returns the user with this platform id, creating the record on first
    /// contact. The stored display name is not overwritten on later calls.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn upsert_by_platform_id(
        &self,
        platform_id: i64,
        display_name: &str,
    ) -> Result<User, StoreError> {
        sqlx::query(
            "INSERT INTO users (platform_id, display_name, created_at) VALUES (?, ?, ?) \
             ON CONFLICT(platform_id) DO NOTHING",
        )
        .bind(platform_id)
        .bind(display_name)
        .bind(Utc::now())
        .execute(self.pool.as_ref())
        .await?;

        let row = sqlx::query("SELECT * FROM users WHERE platform_id = ?")
            .bind(platform_id)
            .fetch_one(self.pool.as_ref())
            .await?;
        user_from_row(&row).map_err(Into::into)
    }

    /// Finds a user by platform id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_by_platform_id(&self, platform_id: i64) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE platform_id = ?")
            .bind(platform_id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(Into::into)
    }

    /// Returns all users, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY id")
            .fetch_all(self.pool.as_ref())
            .await?;
        rows.iter()
            .map(user_from_row)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use crate::repositories::Database;

    #[tokio::test]
    async fn test_upsert_creates_once() {
        let db = Database::in_memory().await.unwrap();
        let users = db.users();

        let first = users.upsert_by_platform_id(42, "alice").await.unwrap();
        let second = users.upsert_by_platform_id(42, "renamed").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.display_name, "alice");
        assert_eq!(users.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_platform_id_missing() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.users().find_by_platform_id(7).await.unwrap().is_none());
    }
}
