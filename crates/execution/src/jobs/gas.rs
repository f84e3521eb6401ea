//! Gas threshold job: sample prices, alert subscribers when cheap.

use crate::context::AppContext;
use chrono::{Duration as ChronoDuration, Utc};
use claim_tracker_domain::entities::UserId;
use claim_tracker_domain::enums::AlertKind;
use claim_tracker_domain::value_objects::GasSample;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// How long gas samples are kept for the optimal-hour estimate.
pub const HISTORY_WINDOW_HOURS: i64 = 24;

/// Hourly job that records a gas sample and notifies subscribers when the
/// average price is at or below the configured threshold.
///
/// The cooldown ledger lives in memory, so a restart may re-notify within
/// the window.
pub struct GasThresholdJob {
    /// Shared rolling sample history.
    history: Arc<RwLock<Vec<GasSample>>>,
    /// Last alert time per user.
    last_alerts: Mutex<HashMap<UserId, Instant>>,
}

impl GasThresholdJob {
    /// Creates the job around a shared sample history.
    pub fn new(history: Arc<RwLock<Vec<GasSample>>>) -> Self {
        Self {
            history,
            last_alerts: Mutex::new(HashMap::new()),
        }
    }

    /// Runs one check cycle.
    ///
    /// # Errors
    /// Returns an error if the subscriber list cannot be read.
    pub async fn run(&self, ctx: &AppContext) -> anyhow::Result<()> {
        info!("Checking gas prices...");

        let prices = ctx.gas.gas_prices().await?;
        self.record_sample(GasSample::new(Utc::now(), prices)).await;

        if prices.average > ctx.config.low_gas_threshold {
            debug!(
                average = prices.average,
                threshold = ctx.config.low_gas_threshold,
                "Gas above threshold, no alerts"
            );
            return Ok(());
        }

        let subscribers = ctx.db.alerts().users_with_active(AlertKind::Gas).await?;
        let text = format!("Low gas prices: {} Gwei", prices.average);
        let mut delivered = 0usize;

        for (user_id, platform_id) in subscribers {
            if !self.cooldown_elapsed(user_id, ctx.config.gas_alert_cooldown).await {
                debug!(user = platform_id, "Gas alert suppressed by cooldown");
                continue;
            }
            match ctx.notifier.notify(platform_id, &text).await {
                Ok(()) => {
                    self.mark_alerted(user_id).await;
                    delivered += 1;
                }
                Err(e) => warn!(user = platform_id, error = %e, "Failed to deliver gas alert"),
            }
        }

        info!(average = prices.average, delivered, "Gas check complete");
        Ok(())
    }

    /// Appends a sample and prunes entries older than the window.
    async fn record_sample(&self, sample: GasSample) {
        let cutoff = sample.at - ChronoDuration::hours(HISTORY_WINDOW_HOURS);
        let mut history = self.history.write().await;
        history.push(sample);
        history.retain(|s| s.at > cutoff);
    }

    async fn cooldown_elapsed(&self, user: UserId, cooldown: std::time::Duration) -> bool {
        if cooldown.is_zero() {
            return true;
        }
        self.last_alerts
            .lock()
            .await
            .get(&user)
            .is_none_or(|last| last.elapsed() >= cooldown)
    }

    async fn mark_alerted(&self, user: UserId) {
        self.last_alerts.lock().await.insert(user, Instant::now());
    }
}
