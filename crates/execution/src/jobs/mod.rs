//! Scheduled background jobs.
//!
//! Each job recomputes its candidate set from store state on every run;
//! the only cross-run memory is the gas job's in-memory history and
//! cooldown ledger.

pub mod claims;
pub mod gas;
pub mod security;

/// Task name for the hourly gas threshold check.
pub const GAS_TASK: &str = "gas-threshold";
/// Task name for the daily upcoming-claims reminder.
pub const CLAIMS_TASK: &str = "upcoming-claims";
/// Task name for the periodic security sweep.
pub const SECURITY_TASK: &str = "security-sweep";
