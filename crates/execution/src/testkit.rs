//! Shared provider stubs for crate tests.

use crate::context::{AppContext, SchedulerConfig};
use async_trait::async_trait;
use claim_tracker_data::Database;
use claim_tracker_domain::value_objects::{EventRef, EventSpec, GasPrices};
use claim_tracker_protocols::{CalendarProvider, GasProvider, NotificationSink, ProviderError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory calendar with switchable create failures.
#[derive(Default)]
pub(crate) struct StubCalendar {
    events: Mutex<HashMap<String, EventSpec>>,
    next_id: AtomicU64,
    fail_creates: AtomicBool,
}

impl StubCalendar {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub(crate) fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    /// Deletes an event behind the reconciler's back.
    pub(crate) fn remove(&self, event_ref: &EventRef) {
        self.events.lock().unwrap().remove(event_ref.as_str());
    }
}

#[async_trait]
impl CalendarProvider for StubCalendar {
    async fn create_event(&self, spec: &EventSpec) -> Result<EventRef, ProviderError> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(ProviderError::Status(500));
        }
        let id = format!("evt-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.events.lock().unwrap().insert(id.clone(), spec.clone());
        Ok(EventRef::new(id))
    }

    async fn update_event(&self, event_ref: &EventRef, spec: &EventSpec) -> Result<(), ProviderError> {
        let mut events = self.events.lock().unwrap();
        match events.get_mut(event_ref.as_str()) {
            Some(slot) => {
                *slot = spec.clone();
                Ok(())
            }
            None => Err(ProviderError::NotFound),
        }
    }

    async fn delete_event(&self, event_ref: &EventRef) -> Result<(), ProviderError> {
        match self.events.lock().unwrap().remove(event_ref.as_str()) {
            Some(_) => Ok(()),
            None => Err(ProviderError::NotFound),
        }
    }

    async fn get_event(&self, event_ref: &EventRef) -> Result<EventSpec, ProviderError> {
        self.events
            .lock()
            .unwrap()
            .get(event_ref.as_str())
            .cloned()
            .ok_or(ProviderError::NotFound)
    }
}

/// Gas provider returning a fixed snapshot.
pub(crate) struct FixedGas(pub(crate) GasPrices);

#[async_trait]
impl GasProvider for FixedGas {
    async fn gas_prices(&self) -> Result<GasPrices, ProviderError> {
        Ok(self.0)
    }
}

/// Sink collecting delivered messages for assertions.
#[derive(Default)]
pub(crate) struct CollectingSink {
    messages: Mutex<Vec<(i64, String)>>,
}

impl CollectingSink {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn messages(&self) -> Vec<(i64, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for CollectingSink {
    async fn notify(&self, platform_id: i64, text: &str) -> Result<(), ProviderError> {
        self.messages
            .lock()
            .unwrap()
            .push((platform_id, text.to_string()));
        Ok(())
    }
}

/// In-memory context with stub providers, returned together with the
/// handles the tests assert on.
pub(crate) async fn test_context(
    prices: GasPrices,
) -> (AppContext, Arc<CollectingSink>, Arc<StubCalendar>) {
    let db = Database::in_memory().await.unwrap();
    let sink = CollectingSink::new();
    let calendar = StubCalendar::new();
    let ctx = AppContext {
        db,
        gas: Arc::new(FixedGas(prices)),
        calendar: calendar.clone(),
        notifier: sink.clone(),
        verifier: None,
        config: SchedulerConfig::default(),
    };
    (ctx, sink, calendar)
}
