//! Wallet repository.

use crate::error::StoreError;
use chrono::Utc;
use claim_tracker_domain::entities::{UserId, Wallet, WalletId};
use claim_tracker_domain::security::is_eth_address;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

fn wallet_from_row(row: &SqliteRow) -> Result<Wallet, sqlx::Error> {
    Ok(Wallet {
        id: WalletId(row.try_get("id")?),
        user_id: UserId(row.try_get("user_id")?),
        address: row.try_get("address")?,
        chain: row.try_get("chain")?,
        label: row.try_get("label")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Repository for wallet records.
#[derive(Clone)]
pub struct WalletRepository {
    pool: Arc<SqlitePool>,
}

impl WalletRepository {
    /// Creates a new WalletRepository.
    #[must_use]
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Registers a wallet for a user. Wallets are immutable once created.
    ///
    /// # Errors
    /// Returns `Validation` for a malformed address or when the user already
    /// registered this address, otherwise any query failure.
    pub async fn create(
        &self,
        user_id: UserId,
        address: &str,
        chain: &str,
        label: Option<&str>,
    ) -> Result<Wallet, StoreError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(StoreError::validation("wallet address required"));
        }
        if !is_eth_address(address) {
            return Err(StoreError::validation(
                "address must start with 0x and contain 40 hex characters",
            ));
        }

        let inserted = sqlx::query(
            "INSERT INTO wallets (user_id, address, chain, label, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(user_id.0)
        .bind(address)
        .bind(chain)
        .bind(label)
        .bind(Utc::now())
        .fetch_one(self.pool.as_ref())
        .await;

        match inserted {
            Ok(row) => wallet_from_row(&row).map_err(Into::into),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                StoreError::validation("wallet already registered for this user"),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns all wallets belonging to a user, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Wallet>, StoreError> {
        let rows = sqlx::query("SELECT * FROM wallets WHERE user_id = ? ORDER BY id")
            .bind(user_id.0)
            .fetch_all(self.pool.as_ref())
            .await?;
        rows.iter()
            .map(wallet_from_row)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }
}
