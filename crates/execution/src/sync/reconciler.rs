//! Calendar reconciler keeping events consistent with positions.

use chrono::{NaiveDate, Utc};
use claim_tracker_data::{PositionRepository, StoreError};
use claim_tracker_domain::DomainError;
use claim_tracker_domain::claims::estimate_next_claim;
use claim_tracker_domain::entities::{Position, PositionId, UserId};
use claim_tracker_domain::value_objects::{EventRef, EventSpec};
use claim_tracker_protocols::{CalendarProvider, ProviderError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Failure while syncing a position with the calendar.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Store lookup or update failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// Calendar provider call failed.
    #[error("calendar error: {0}")]
    Calendar(#[from] ProviderError),
    /// Claim estimation rejected the position's fields.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    /// Lost an install race and the winning reference vanished before it
    /// could be adopted.
    #[error("conflicting calendar updates for position {0}")]
    Conflict(i64),
}

/// Outcome of a fan-out sync over a user's active positions.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// Positions whose events are now in sync.
    pub synced: u32,
    /// Positions that failed, with the failure message.
    pub failed: Vec<(PositionId, String)>,
}

impl ReconcileReport {
    /// True when every position synced.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A claim reminder read back from the synced calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingClaim {
    pub position_id: PositionId,
    pub protocol: String,
    pub asset: String,
    pub amount: Decimal,
    pub apy: Option<Decimal>,
    pub claim_date: NaiveDate,
    pub days_until: i64,
}

/// Reconciler for keeping calendar events in sync with positions.
///
/// The event reference stored on each position is the unit of ownership:
/// installs go through compare-and-set so two concurrent cycles never leave
/// two live events for the same position.
pub struct Reconciler {
    /// Position store.
    positions: PositionRepository,
    /// Calendar provider.
    calendar: Arc<dyn CalendarProvider>,
}

impl Reconciler {
    /// Creates a new reconciler.
    pub fn new(positions: PositionRepository, calendar: Arc<dyn CalendarProvider>) -> Self {
        Self {
            positions,
            calendar,
        }
    }

    /// Brings one position's calendar event in line with its next estimated
    /// claim date and returns the live reference.
    ///
    /// A position without a reference gets a fresh event; one with a
    /// reference gets an in-place update. A reference whose event has
    /// vanished on the provider side is cleared and recreated once. A
    /// create failure leaves the reference null, so the next scheduled
    /// cycle retries.
    ///
    /// # Errors
    /// Returns `Domain` for unusable position fields, `Calendar` for
    /// provider failures, `Store` for persistence failures.
    pub async fn reconcile(&self, position: &Position) -> Result<EventRef, ReconcileError> {
        let target = estimate_next_claim(&position.protocol, &position.asset, Utc::now())?;
        let spec = EventSpec::yield_claim(&position.protocol, &position.asset, target.date_naive());

        match &position.calendar_event_ref {
            None => self.install_event(position.id, &spec).await,
            Some(event_ref) => match self.calendar.update_event(event_ref, &spec).await {
                Ok(()) => {
                    debug!(position = position.id.0, event = event_ref.as_str(), "Updated event");
                    Ok(event_ref.clone())
                }
                Err(ProviderError::NotFound) => {
                    // The event vanished out from under us. Drop the stale
                    // reference and go back through the create path once.
                    self.positions
                        .compare_and_set_event_ref(position.id, Some(event_ref), None)
                        .await?;
                    self.install_event(position.id, &spec).await
                }
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Creates an event and installs its reference, yielding to a
    /// concurrent winner if one got there first.
    async fn install_event(
        &self,
        id: PositionId,
        spec: &EventSpec,
    ) -> Result<EventRef, ReconcileError> {
        let created = self.calendar.create_event(spec).await?;
        let installed = self
            .positions
            .compare_and_set_event_ref(id, None, Some(&created))
            .await?;
        if installed {
            debug!(position = id.0, event = created.as_str(), "Installed event");
            return Ok(created);
        }

        // Another writer installed a reference while our event was in
        // flight. Keep exactly one live event: delete ours, adopt theirs.
        if let Err(e) = self.calendar.delete_event(&created).await {
            warn!(event = created.as_str(), error = %e, "Failed to delete duplicate event");
        }
        let current = self
            .positions
            .find(id)
            .await?
            .ok_or(ReconcileError::Store(StoreError::NotFound))?;
        current
            .calendar_event_ref
            .ok_or(ReconcileError::Conflict(id.0))
    }

    /// Syncs every active position for a user, isolating per-position
    /// failures.
    ///
    /// # Errors
    /// Returns `Store` if the active positions cannot be listed; individual
    /// sync failures land in the report instead.
    pub async fn reconcile_all(&self, user_id: UserId) -> Result<ReconcileReport, ReconcileError> {
        let active = self.positions.list_active(user_id).await?;
        let mut report = ReconcileReport::default();

        for position in &active {
            match self.reconcile(position).await {
                Ok(_) => report.synced += 1,
                Err(e) => {
                    warn!(position = position.id.0, error = %e, "Reconciliation failed");
                    report.failed.push((position.id, e.to_string()));
                }
            }
        }

        Ok(report)
    }

    /// Removes the calendar event for a closing position and clears the
    /// stored reference. A missing event is tolerated.
    ///
    /// # Errors
    /// Returns `Calendar` if the delete fails for any reason other than the
    /// event already being gone, `Store` if the reference cannot be cleared.
    pub async fn release(&self, position: &Position) -> Result<(), ReconcileError> {
        let Some(event_ref) = &position.calendar_event_ref else {
            return Ok(());
        };

        match self.calendar.delete_event(event_ref).await {
            Ok(()) | Err(ProviderError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
        self.positions
            .set_calendar_event_ref(position.id, None)
            .await?;
        debug!(position = position.id.0, "Released event");
        Ok(())
    }

    /// Upcoming claims for a user's active positions, read back from the
    /// already-synced calendar events rather than recomputed.
    ///
    /// Positions without a reference, or whose event has gone missing, are
    /// skipped; claims outside `0..=days_ahead` days from today are
    /// filtered out.
    ///
    /// # Errors
    /// Returns `Store` if positions cannot be listed, `Calendar` for
    /// provider failures other than a missing event.
    pub async fn upcoming_claims(
        &self,
        user_id: UserId,
        days_ahead: i64,
    ) -> Result<Vec<UpcomingClaim>, ReconcileError> {
        let today = Utc::now().date_naive();
        let mut claims = Vec::new();

        for position in self.positions.list_active(user_id).await? {
            let Some(event_ref) = &position.calendar_event_ref else {
                continue;
            };
            let spec = match self.calendar.get_event(event_ref).await {
                Ok(spec) => spec,
                Err(ProviderError::NotFound) => {
                    debug!(position = position.id.0, "Event missing, skipping claim");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let days_until = (spec.date - today).num_days();
            if (0..=days_ahead).contains(&days_until) {
                claims.push(UpcomingClaim {
                    position_id: position.id,
                    protocol: position.protocol,
                    asset: position.asset,
                    amount: position.amount,
                    apy: position.apy,
                    claim_date: spec.date,
                    days_until,
                });
            }
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::StubCalendar;
    use claim_tracker_data::Database;
    use claim_tracker_domain::enums::PositionType;
    use rust_decimal_macros::dec;

    async fn seeded() -> (Database, UserId) {
        let db = Database::in_memory().await.unwrap();
        let user = db.users().upsert_by_platform_id(1, "alice").await.unwrap();
        (db, user.id)
    }

    async fn open_position(db: &Database, user_id: UserId, protocol: &str) -> Position {
        db.positions()
            .create(
                user_id,
                None,
                protocol,
                "USDC",
                dec!(100),
                PositionType::Lend,
                Some(dec!(4.2)),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_reconcile_creates_then_updates() {
        let (db, user_id) = seeded().await;
        let calendar = StubCalendar::new();
        let reconciler = Reconciler::new(db.positions(), calendar.clone());

        let position = open_position(&db, user_id, "Aave").await;
        let event_ref = reconciler.reconcile(&position).await.unwrap();
        assert_eq!(calendar.event_count(), 1);

        let stored = db.positions().find(position.id).await.unwrap().unwrap();
        assert_eq!(stored.calendar_event_ref.as_ref(), Some(&event_ref));

        // Second cycle refreshes in place instead of creating another event.
        let second = reconciler.reconcile(&stored).await.unwrap();
        assert_eq!(second, event_ref);
        assert_eq!(calendar.event_count(), 1);
    }

    #[tokio::test]
    async fn test_lost_install_race_adopts_winner() {
        let (db, user_id) = seeded().await;
        let calendar = StubCalendar::new();
        let reconciler = Reconciler::new(db.positions(), calendar.clone());

        // The caller holds a stale snapshot with no reference while another
        // cycle already installed one.
        let stale = open_position(&db, user_id, "Aave").await;
        let winner = EventRef::new("winner");
        db.positions()
            .set_calendar_event_ref(stale.id, Some(&winner))
            .await
            .unwrap();

        let adopted = reconciler.reconcile(&stale).await.unwrap();
        assert_eq!(adopted, winner);
        // The loser's freshly created event was deleted again.
        assert_eq!(calendar.event_count(), 0);
        let stored = db.positions().find(stale.id).await.unwrap().unwrap();
        assert_eq!(stored.calendar_event_ref, Some(winner));
    }

    #[tokio::test]
    async fn test_vanished_event_is_recreated_once() {
        let (db, user_id) = seeded().await;
        let calendar = StubCalendar::new();
        let reconciler = Reconciler::new(db.positions(), calendar.clone());

        let position = open_position(&db, user_id, "Compound").await;
        let first = reconciler.reconcile(&position).await.unwrap();

        // Someone deleted the event directly in the calendar.
        calendar.remove(&first);

        let stored = db.positions().find(position.id).await.unwrap().unwrap();
        let second = reconciler.reconcile(&stored).await.unwrap();
        assert_ne!(second, first);
        assert_eq!(calendar.event_count(), 1);

        let refreshed = db.positions().find(position.id).await.unwrap().unwrap();
        assert_eq!(refreshed.calendar_event_ref, Some(second));
    }

    #[tokio::test]
    async fn test_create_failure_leaves_ref_null() {
        let (db, user_id) = seeded().await;
        let calendar = StubCalendar::new();
        let reconciler = Reconciler::new(db.positions(), calendar.clone());

        let position = open_position(&db, user_id, "Curve").await;
        calendar.fail_creates(true);
        assert!(reconciler.reconcile(&position).await.is_err());

        let stored = db.positions().find(position.id).await.unwrap().unwrap();
        assert!(stored.calendar_event_ref.is_none());

        // The next cycle succeeds once the provider recovers.
        calendar.fail_creates(false);
        assert!(reconciler.reconcile(&stored).await.is_ok());
    }

    #[tokio::test]
    async fn test_reconcile_all_isolates_failures() {
        let (db, user_id) = seeded().await;
        let calendar = StubCalendar::new();
        let reconciler = Reconciler::new(db.positions(), calendar.clone());

        let synced = open_position(&db, user_id, "Aave").await;
        reconciler.reconcile(&synced).await.unwrap();
        let unsynced = open_position(&db, user_id, "Compound").await;

        // Creates fail while updates still work: the already-synced
        // position refreshes, the new one lands in the failure list.
        calendar.fail_creates(true);
        let report = reconciler.reconcile_all(user_id).await.unwrap();
        assert_eq!(report.synced, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, unsynced.id);
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn test_release_tolerates_missing_event() {
        let (db, user_id) = seeded().await;
        let calendar = StubCalendar::new();
        let reconciler = Reconciler::new(db.positions(), calendar.clone());

        let position = open_position(&db, user_id, "Aave").await;
        let event_ref = reconciler.reconcile(&position).await.unwrap();
        calendar.remove(&event_ref);

        let stored = db.positions().find(position.id).await.unwrap().unwrap();
        reconciler.release(&stored).await.unwrap();

        let cleared = db.positions().find(position.id).await.unwrap().unwrap();
        assert!(cleared.calendar_event_ref.is_none());

        // A position that never synced releases as a no-op.
        let fresh = open_position(&db, user_id, "Compound").await;
        reconciler.release(&fresh).await.unwrap();
    }

    #[tokio::test]
    async fn test_upcoming_claims_filters_by_window() {
        let (db, user_id) = seeded().await;
        let calendar = StubCalendar::new();
        let reconciler = Reconciler::new(db.positions(), calendar.clone());

        // Compound claims in 3 days, Uniswap in 14.
        let near = open_position(&db, user_id, "Compound").await;
        let far = open_position(&db, user_id, "Uniswap").await;
        reconciler.reconcile(&near).await.unwrap();
        reconciler.reconcile(&far).await.unwrap();
        // A third position never synced and must be skipped.
        open_position(&db, user_id, "Aave").await;

        let week = reconciler.upcoming_claims(user_id, 7).await.unwrap();
        assert_eq!(week.len(), 1);
        assert_eq!(week[0].position_id, near.id);
        assert_eq!(week[0].days_until, 3);

        let month = reconciler.upcoming_claims(user_id, 30).await.unwrap();
        assert_eq!(month.len(), 2);
    }
}
