//! Alert subscription repository.

use crate::error::StoreError;
use crate::repositories::parsed_column;
use chrono::Utc;
use claim_tracker_domain::entities::{Alert, AlertId, UserId};
use claim_tracker_domain::enums::AlertKind;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

fn alert_from_row(row: &SqliteRow) -> Result<Alert, sqlx::Error> {
    Ok(Alert {
        id: AlertId(row.try_get("id")?),
        user_id: UserId(row.try_get("user_id")?),
        kind: parsed_column::<AlertKind>(row, "alert_type")?,
        parameters: row.try_get("parameters")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Repository for alert subscriptions.
#[derive(Clone)]
pub struct AlertRepository {
    pool: Arc<SqlitePool>,
}

impl AlertRepository {
    /// Creates a new AlertRepository.
    #[must_use]
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Subscribes a user to an alert kind. An existing subscription is
    /// re-activated with the new parameters instead of duplicated.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn upsert(
        &self,
        user_id: UserId,
        kind: AlertKind,
        parameters: &str,
    ) -> Result<Alert, StoreError> {
        let updated = sqlx::query(
            "UPDATE alerts SET parameters = ?, is_active = 1 \
             WHERE user_id = ? AND alert_type = ?",
        )
        .bind(parameters)
        .bind(user_id.0)
        .bind(kind.as_str())
        .execute(self.pool.as_ref())
        .await?;

        if updated.rows_affected() == 0 {
            sqlx::query(
                "INSERT INTO alerts (user_id, alert_type, parameters, is_active, created_at) \
                 VALUES (?, ?, ?, 1, ?)",
            )
            .bind(user_id.0)
            .bind(kind.as_str())
            .bind(parameters)
            .bind(Utc::now())
            .execute(self.pool.as_ref())
            .await?;
        }

        let row = sqlx::query("SELECT * FROM alerts WHERE user_id = ? AND alert_type = ?")
            .bind(user_id.0)
            .bind(kind.as_str())
            .fetch_one(self.pool.as_ref())
            .await?;
        alert_from_row(&row).map_err(Into::into)
    }

    /// Deactivates a subscription. Alerts are never deleted.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn deactivate(&self, user_id: UserId, kind: AlertKind) -> Result<(), StoreError> {
        sqlx::query("UPDATE alerts SET is_active = 0 WHERE user_id = ? AND alert_type = ?")
            .bind(user_id.0)
            .bind(kind.as_str())
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    /// Returns the active subscription of this kind for a user, if any.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_active(
        &self,
        user_id: UserId,
        kind: AlertKind,
    ) -> Result<Option<Alert>, StoreError> {
        let row = sqlx::query(
            "SELECT * FROM alerts WHERE user_id = ? AND alert_type = ? AND is_active = 1",
        )
        .bind(user_id.0)
        .bind(kind.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;
        row.as_ref()
            .map(alert_from_row)
            .transpose()
            .map_err(Into::into)
    }

    /// Returns (user id, platform id) for every user holding an active
    /// subscription of this kind. Drives the notification fan-out.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn users_with_active(
        &self,
        kind: AlertKind,
    ) -> Result<Vec<(UserId, i64)>, StoreError> {
        let rows = sqlx::query(
            "SELECT DISTINCT u.id, u.platform_id \
             FROM alerts a \
             JOIN users u ON a.user_id = u.id \
             WHERE a.alert_type = ? AND a.is_active = 1 \
             ORDER BY u.id",
        )
        .bind(kind.as_str())
        .fetch_all(self.pool.as_ref())
        .await?;
        rows.iter()
            .map(|row| {
                Ok::<_, sqlx::Error>((UserId(row.try_get("id")?), row.try_get("platform_id")?))
            })
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::Database;

    #[tokio::test]
    async fn test_upsert_reactivates_instead_of_duplicating() {
        let db = Database::in_memory().await.unwrap();
        let user = db.users().upsert_by_platform_id(9, "alice").await.unwrap();
        let alerts = db.alerts();

        alerts
            .upsert(user.id, AlertKind::Gas, r#"{"threshold":30}"#)
            .await
            .unwrap();
        alerts.deactivate(user.id, AlertKind::Gas).await.unwrap();
        assert!(alerts
            .find_active(user.id, AlertKind::Gas)
            .await
            .unwrap()
            .is_none());

        let revived = alerts
            .upsert(user.id, AlertKind::Gas, r#"{"threshold":25}"#)
            .await
            .unwrap();
        assert!(revived.is_active);
        assert_eq!(revived.parameters, r#"{"threshold":25}"#);

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM alerts")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_users_with_active_joins_platform_id() {
        let db = Database::in_memory().await.unwrap();
        let alice = db.users().upsert_by_platform_id(100, "alice").await.unwrap();
        let bob = db.users().upsert_by_platform_id(200, "bob").await.unwrap();
        let alerts = db.alerts();

        alerts.upsert(alice.id, AlertKind::Gas, "{}").await.unwrap();
        alerts.upsert(bob.id, AlertKind::Gas, "{}").await.unwrap();
        alerts.deactivate(bob.id, AlertKind::Gas).await.unwrap();

        let subscribers = alerts.users_with_active(AlertKind::Gas).await.unwrap();
        assert_eq!(subscribers, vec![(alice.id, 100)]);
    }
}
