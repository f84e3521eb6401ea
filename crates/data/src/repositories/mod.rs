//! Repository implementations for database persistence.
//!
//! This module provides repository patterns for storing and retrieving
//! users, wallets, yield positions and alert subscriptions.

mod alert_repository;
mod position_repository;
mod user_repository;
mod wallet_repository;

pub use alert_repository::AlertRepository;
pub use position_repository::PositionRepository;
pub use user_repository::UserRepository;
pub use wallet_repository::WalletRepository;

use crate::error::StoreError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Database connection wrapper for repositories.
#[derive(Clone)]
pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    /// Opens the database file at `path`, creating the file and its parent
    /// directory when missing, and initializes the schema.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or a statement fails.
    pub async fn connect(path: &str) -> Result<Self, StoreError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::validation(format!("cannot create {}: {e}", parent.display()))
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self {
            pool: Arc::new(pool),
        };
        db.init_schema().await?;
        info!(path = %path, "database ready");
        Ok(db)
    }

    /// Opens a private in-memory database, schema initialized.
    ///
    /// # Errors
    /// Returns an error if a statement fails.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new().in_memory(true).foreign_keys(true);
        // A single never-expiring connection keeps every query on the same
        // in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self {
            pool: Arc::new(pool),
        };
        db.init_schema().await?;
        Ok(db)
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates a UserRepository instance.
    #[must_use]
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Creates a WalletRepository instance.
    #[must_use]
    pub fn wallets(&self) -> WalletRepository {
        WalletRepository::new(self.pool.clone())
    }

    /// Creates a PositionRepository instance.
    #[must_use]
    pub fn positions(&self) -> PositionRepository {
        PositionRepository::new(self.pool.clone())
    }

    /// Creates an AlertRepository instance.
    #[must_use]
    pub fn alerts(&self) -> AlertRepository {
        AlertRepository::new(self.pool.clone())
    }

    /// Creates the schema. Idempotent.
    ///
    /// # Errors
    /// Returns an error if a statement fails.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(include_str!("../../migrations/001_initial_schema.sql"))
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}

/// Decodes a REAL column into a Decimal.
pub(crate) fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let raw: f64 = row.try_get(column)?;
    Decimal::from_f64_retain(raw).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("non-finite value {raw}").into(),
    })
}

/// Decodes a nullable REAL column into an optional Decimal.
pub(crate) fn optional_decimal_column(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, sqlx::Error> {
    let raw: Option<f64> = row.try_get(column)?;
    raw.map(|value| {
        Decimal::from_f64_retain(value).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: format!("non-finite value {value}").into(),
        })
    })
    .transpose()
}

/// Decodes a TEXT column through its `FromStr` implementation.
pub(crate) fn parsed_column<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: T::Err| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// Converts a Decimal into the REAL representation used for storage.
pub(crate) fn real_param(value: Decimal) -> Result<f64, StoreError> {
    value
        .to_f64()
        .ok_or_else(|| StoreError::validation("value does not fit a 64-bit float"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_creates_all_tables() {
        let db = Database::in_memory().await.unwrap();
        // Idempotent: running again must not fail.
        db.init_schema().await.unwrap();

        let tables: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(db.pool())
                .await
                .unwrap();
        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        for expected in ["alerts", "positions", "users", "wallets"] {
            assert!(names.contains(&expected), "missing table {expected}");
        }
    }

    #[tokio::test]
    async fn test_connect_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.db");
        let db = Database::connect(path.to_str().unwrap()).await.unwrap();
        sqlx::query("SELECT COUNT(*) FROM users")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert!(path.exists());
    }
}
