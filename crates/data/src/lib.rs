//! SQLite persistence for the claim tracker.
//!
//! This crate provides durable storage for:
//! - Users keyed by chat platform id
//! - Wallets, unique per (user, address)
//! - Yield positions, including the calendar event reference
//! - Alert subscriptions
//!
//! The store is a single local SQLite file (or an in-memory database in
//! tests); every mutation is awaited before returning.

/// Store error type.
pub mod error;
/// Connection management and repositories.
pub mod repositories;

pub use error::StoreError;
pub use repositories::{
    AlertRepository, Database, PositionRepository, UserRepository, WalletRepository,
};
