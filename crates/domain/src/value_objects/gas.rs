use crate::enums::Urgency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gas price snapshot in gwei, tiered by confirmation speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPrices {
    pub slow: u64,
    pub average: u64,
    pub fast: u64,
}

impl GasPrices {
    /// Served when the oracle is unreachable or returns garbage.
    pub const FALLBACK: Self = Self {
        slow: 30,
        average: 45,
        fast: 60,
    };

    #[must_use]
    pub fn new(slow: u64, average: u64, fast: u64) -> Self {
        Self {
            slow,
            average,
            fast,
        }
    }

    /// Price tier matching a transaction urgency.
    #[must_use]
    pub fn tier(&self, urgency: Urgency) -> u64 {
        match urgency {
            Urgency::Low => self.slow,
            Urgency::Normal => self.average,
            Urgency::High => self.fast,
        }
    }
}

/// A timestamped gas price observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasSample {
    pub at: DateTime<Utc>,
    pub prices: GasPrices,
}

impl GasSample {
    #[must_use]
    pub fn new(at: DateTime<Utc>, prices: GasPrices) -> Self {
        Self { at, prices }
    }
}
