//! Shared handles and tuning for the background engine.

use crate::sync::Reconciler;
use claim_tracker_data::Database;
use claim_tracker_protocols::{CalendarProvider, ContractVerifier, GasProvider, NotificationSink};
use std::sync::Arc;
use std::time::Duration;

/// Tuning knobs for the scheduled jobs.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Average gwei at or below which gas subscribers are notified.
    pub low_gas_threshold: u64,
    /// How many days ahead the claims job looks.
    pub claims_lookahead: i64,
    /// Minimum gap between gas alerts to the same user. Zero means every
    /// qualifying run notifies.
    pub gas_alert_cooldown: Duration,
    /// Per-run bound on a single job.
    pub job_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            low_gas_threshold: 30,
            claims_lookahead: 1,
            gas_alert_cooldown: Duration::ZERO,
            job_timeout: Duration::from_secs(60),
        }
    }
}

/// Everything the jobs need: store handles, provider handles and tuning.
///
/// Cloning is cheap; all handles are shared.
#[derive(Clone)]
pub struct AppContext {
    /// Database handle.
    pub db: Database,
    /// Gas price oracle.
    pub gas: Arc<dyn GasProvider>,
    /// Calendar provider.
    pub calendar: Arc<dyn CalendarProvider>,
    /// Notification delivery.
    pub notifier: Arc<dyn NotificationSink>,
    /// Optional contract verifier for security sweeps.
    pub verifier: Option<Arc<dyn ContractVerifier>>,
    /// Job tuning.
    pub config: SchedulerConfig,
}

impl AppContext {
    /// Builds a reconciler over this context's store and calendar.
    #[must_use]
    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.db.positions(), Arc::clone(&self.calendar))
    }
}
