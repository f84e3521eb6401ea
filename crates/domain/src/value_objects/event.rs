use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier handed back by the calendar provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventRef(pub String);

impl EventRef {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Content of a claim-reminder calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSpec {
    pub summary: String,
    pub description: String,
    pub location: String,
    pub date: NaiveDate,
}

impl EventSpec {
    /// Canonical start time on the target date.
    pub const START_HOUR_UTC: u32 = 14;
    /// Event window length.
    pub const DURATION_MINUTES: i64 = 30;
    /// Email reminder lead time.
    pub const EMAIL_REMINDER_MINUTES: u32 = 24 * 60;
    /// Popup reminder lead time.
    pub const POPUP_REMINDER_MINUTES: u32 = 60;

    /// Builds the reminder event for a position's next claim date.
    #[must_use]
    pub fn yield_claim(protocol: &str, asset: &str, date: NaiveDate) -> Self {
        Self {
            summary: format!("Claim {asset} Yield from {protocol}"),
            description: format!(
                "Time to claim your yield for {asset} from {protocol}. \
                 Check gas prices before proceeding."
            ),
            location: format!("{protocol} DeFi Protocol"),
            date,
        }
    }

    /// Window start: the canonical hour on the target date, UTC.
    #[must_use]
    pub fn starts_at(&self) -> DateTime<Utc> {
        let start = NaiveTime::from_hms_opt(Self::START_HOUR_UTC, 0, 0).unwrap_or_default();
        self.date.and_time(start).and_utc()
    }

    /// Window end, a fixed duration after the start.
    #[must_use]
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.starts_at() + Duration::minutes(Self::DURATION_MINUTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yield_claim_summary() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let spec = EventSpec::yield_claim("Aave", "USDC", date);
        assert_eq!(spec.summary, "Claim USDC Yield from Aave");
        assert_eq!(spec.location, "Aave DeFi Protocol");
    }

    #[test]
    fn test_event_window() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let spec = EventSpec::yield_claim("Curve", "3pool", date);
        let start = spec.starts_at();
        let end = spec.ends_at();
        assert_eq!(start.format("%H:%M").to_string(), "14:00");
        assert_eq!((end - start).num_minutes(), 30);
    }
}
