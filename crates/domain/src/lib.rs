//! Core domain model for yield claim tracking.
//!
//! This crate holds the pure, side-effect-free parts of the system:
//! - Entities persisted by the data layer (users, wallets, positions, alerts)
//! - Claim schedule estimation per protocol
//! - Gas, batching and portfolio analytics
//! - Yield strategy allocation
//! - Phishing and approval risk checks
//!
//! Nothing in here performs I/O; providers and repositories live in the
//! `protocols` and `data` crates.

/// Claim frequency table and next-claim estimation.
pub mod claims;
/// Persisted entities.
pub mod entities;
/// Shared enums with string round-tripping.
pub mod enums;
/// Domain error type.
pub mod error;
/// Pure analytics over gas history and positions.
pub mod metrics;
/// Phishing and approval risk heuristics.
pub mod security;
/// Small immutable values shared across crates.
pub mod value_objects;

pub use error::DomainError;
