//! Position repository, including the calendar reference column.

use crate::error::StoreError;
use crate::repositories::{decimal_column, optional_decimal_column, parsed_column, real_param};
use chrono::Utc;
use claim_tracker_domain::entities::{Position, PositionId, UserId, WalletId};
use claim_tracker_domain::enums::{PositionStatus, PositionType};
use claim_tracker_domain::value_objects::EventRef;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

fn position_from_row(row: &SqliteRow) -> Result<Position, sqlx::Error> {
    Ok(Position {
        id: PositionId(row.try_get("id")?),
        user_id: UserId(row.try_get("user_id")?),
        wallet_id: row.try_get::<Option<i64>, _>("wallet_id")?.map(WalletId),
        protocol: row.try_get("protocol")?,
        asset: row.try_get("asset")?,
        amount: decimal_column(row, "amount")?,
        position_type: parsed_column::<PositionType>(row, "position_type")?,
        apy: optional_decimal_column(row, "apy")?,
        status: parsed_column::<PositionStatus>(row, "status")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        calendar_event_ref: row
            .try_get::<Option<String>, _>("calendar_event_ref")?
            .map(EventRef),
    })
}

/// Repository for yield positions.
#[derive(Clone)]
pub struct PositionRepository {
    pool: Arc<SqlitePool>,
}

impl PositionRepository {
    /// Creates a new PositionRepository.
    #[must_use]
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Records a new active position starting now.
    ///
    /// # Errors
    /// Returns `Validation` for an empty protocol or asset or a negative
    /// amount, otherwise any query failure.
    pub async fn create(
        &self,
        user_id: UserId,
        wallet_id: Option<WalletId>,
        protocol: &str,
        asset: &str,
        amount: Decimal,
        position_type: PositionType,
        apy: Option<Decimal>,
    ) -> Result<Position, StoreError> {
        let protocol = protocol.trim();
        let asset = asset.trim();
        if protocol.is_empty() || asset.is_empty() {
            return Err(StoreError::validation("protocol and asset are required"));
        }
        if amount < Decimal::ZERO {
            return Err(StoreError::validation("amount cannot be negative"));
        }

        let row = sqlx::query(
            "INSERT INTO positions \
             (user_id, wallet_id, protocol, asset, amount, position_type, apy, start_date, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(user_id.0)
        .bind(wallet_id.map(|w| w.0))
        .bind(protocol)
        .bind(asset)
        .bind(real_param(amount)?)
        .bind(position_type.as_str())
        .bind(apy.map(real_param).transpose()?)
        .bind(Utc::now())
        .bind(PositionStatus::Active.as_str())
        .fetch_one(self.pool.as_ref())
        .await?;
        position_from_row(&row).map_err(Into::into)
    }

    /// Finds a position by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find(&self, id: PositionId) -> Result<Option<Position>, StoreError> {
        let row = sqlx::query("SELECT * FROM positions WHERE id = ?")
            .bind(id.0)
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.as_ref()
            .map(position_from_row)
            .transpose()
            .map_err(Into::into)
    }

    /// Returns a user's active positions, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_active(&self, user_id: UserId) -> Result<Vec<Position>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM positions WHERE user_id = ? AND status = ? ORDER BY start_date, id",
        )
        .bind(user_id.0)
        .bind(PositionStatus::Active.as_str())
        .fetch_all(self.pool.as_ref())
        .await?;
        rows.iter()
            .map(position_from_row)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }

    /// Closes a position, stamping the end date. Idempotent: closing a
    /// position that is already closed is a no-op.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn close(&self, id: PositionId) -> Result<(), StoreError> {
        sqlx::query("UPDATE positions SET status = ?, end_date = ? WHERE id = ? AND status = ?")
            .bind(PositionStatus::Closed.as_str())
            .bind(Utc::now())
            .bind(id.0)
            .bind(PositionStatus::Active.as_str())
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    /// Overwrites the calendar event reference.
    ///
    /// # Errors
    /// Returns `NotFound` if the position does not exist, otherwise any
    /// query failure.
    pub async fn set_calendar_event_ref(
        &self,
        id: PositionId,
        event_ref: Option<&EventRef>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE positions SET calendar_event_ref = ? WHERE id = ?")
            .bind(event_ref.map(EventRef::as_str))
            .bind(id.0)
            .execute(self.pool.as_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Swaps the calendar event reference only if it still holds `expected`.
    /// Returns whether the swap applied; a false return means another writer
    /// got there first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn compare_and_set_event_ref(
        &self,
        id: PositionId,
        expected: Option<&EventRef>,
        new: Option<&EventRef>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE positions SET calendar_event_ref = ? \
             WHERE id = ? AND calendar_event_ref IS ?",
        )
        .bind(new.map(EventRef::as_str))
        .bind(id.0)
        .bind(expected.map(EventRef::as_str))
        .execute(self.pool.as_ref())
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::Database;
    use rust_decimal_macros::dec;

    async fn seeded() -> (Database, UserId) {
        let db = Database::in_memory().await.unwrap();
        let user = db.users().upsert_by_platform_id(1, "alice").await.unwrap();
        (db, user.id)
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let (db, user_id) = seeded().await;
        let position = db
            .positions()
            .create(
                user_id,
                None,
                "Aave",
                "USDC",
                dec!(100),
                PositionType::Lend,
                Some(dec!(4.2)),
            )
            .await
            .unwrap();

        assert_eq!(position.status, PositionStatus::Active);
        assert_eq!(position.amount, dec!(100));
        assert!(position.end_date.is_none());
        assert!(position.calendar_event_ref.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let (db, user_id) = seeded().await;
        let positions = db.positions();

        assert!(positions
            .create(user_id, None, " ", "USDC", dec!(1), PositionType::Lend, None)
            .await
            .is_err());
        assert!(positions
            .create(user_id, None, "Aave", "USDC", dec!(-1), PositionType::Lend, None)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (db, user_id) = seeded().await;
        let positions = db.positions();
        let position = positions
            .create(user_id, None, "Aave", "USDC", dec!(100), PositionType::Lend, None)
            .await
            .unwrap();

        positions.close(position.id).await.unwrap();
        let closed = positions.find(position.id).await.unwrap().unwrap();
        assert_eq!(closed.status, PositionStatus::Closed);
        let first_end = closed.end_date.unwrap();

        positions.close(position.id).await.unwrap();
        let again = positions.find(position.id).await.unwrap().unwrap();
        assert_eq!(again.end_date.unwrap(), first_end);

        assert!(positions.list_active(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_active_ordering() {
        let (db, user_id) = seeded().await;
        let positions = db.positions();
        for protocol in ["Aave", "Compound", "Uniswap"] {
            positions
                .create(user_id, None, protocol, "USDC", dec!(1), PositionType::Lend, None)
                .await
                .unwrap();
        }

        let active = positions.list_active(user_id).await.unwrap();
        let names: Vec<&str> = active.iter().map(|p| p.protocol.as_str()).collect();
        assert_eq!(names, vec!["Aave", "Compound", "Uniswap"]);
    }

    #[tokio::test]
    async fn test_compare_and_set_event_ref() {
        let (db, user_id) = seeded().await;
        let positions = db.positions();
        let position = positions
            .create(user_id, None, "Aave", "USDC", dec!(1), PositionType::Lend, None)
            .await
            .unwrap();

        let first = EventRef::new("evt-1");
        let second = EventRef::new("evt-2");

        // Install against an empty slot.
        assert!(positions
            .compare_and_set_event_ref(position.id, None, Some(&first))
            .await
            .unwrap());
        // A second install attempt loses.
        assert!(!positions
            .compare_and_set_event_ref(position.id, None, Some(&second))
            .await
            .unwrap());
        // Swap with the correct expectation wins.
        assert!(positions
            .compare_and_set_event_ref(position.id, Some(&first), Some(&second))
            .await
            .unwrap());

        let stored = positions.find(position.id).await.unwrap().unwrap();
        assert_eq!(stored.calendar_event_ref, Some(second));
    }

    #[tokio::test]
    async fn test_set_event_ref_missing_position() {
        let (db, _) = seeded().await;
        let err = db
            .positions()
            .set_calendar_event_ref(PositionId(999), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
