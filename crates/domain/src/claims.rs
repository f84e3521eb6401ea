//! Claim date estimation from per-protocol claim cadences.

use crate::error::DomainError;
use chrono::{DateTime, Duration, Utc};

/// Days between claimable yield events, per protocol.
const CLAIM_FREQUENCIES: &[(&str, i64)] = &[
    ("aave", 7),
    ("compound", 3),
    ("uniswap", 14),
    ("curve", 7),
    ("yearn", 7),
    ("convex", 14),
    ("harvest", 7),
];

/// Cadence assumed for protocols not in the table.
pub const DEFAULT_CLAIM_FREQUENCY_DAYS: i64 = 7;

/// Claim cadence in days for a protocol, case-insensitive.
#[must_use]
pub fn claim_frequency_days(protocol: &str) -> i64 {
    let needle = protocol.to_lowercase();
    CLAIM_FREQUENCIES
        .iter()
        .find(|(name, _)| *name == needle)
        .map_or(DEFAULT_CLAIM_FREQUENCY_DAYS, |(_, days)| *days)
}

/// Next estimated claim date: `as_of` plus the protocol's cadence.
///
/// Deterministic, no I/O; the reconciler and scheduler both route
/// through here so estimates never drift between components.
///
/// # Errors
/// Returns `DomainError::Validation` if protocol or asset is empty.
pub fn estimate_next_claim(
    protocol: &str,
    asset: &str,
    as_of: DateTime<Utc>,
) -> Result<DateTime<Utc>, DomainError> {
    if protocol.trim().is_empty() {
        return Err(DomainError::validation("protocol must not be empty"));
    }
    if asset.trim().is_empty() {
        return Err(DomainError::validation("asset must not be empty"));
    }

    Ok(as_of + Duration::days(claim_frequency_days(protocol)))
}
