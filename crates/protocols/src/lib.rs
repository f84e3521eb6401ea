//! External providers: gas oracle, calendar, notification delivery, yield
//! catalog and contract verification.
//!
//! Every provider is reached through a trait so the execution layer can be
//! tested against stubs. Implementations degrade on missing credentials
//! instead of failing construction.

use std::time::Duration;

/// Calendar provider and the Google Calendar v3 REST client.
pub mod calendar;
/// Provider error type.
pub mod error;
/// Gas price oracle.
pub mod gas;
/// Notification sinks.
pub mod notify;
/// Contract verification.
pub mod verify;
/// Yield opportunity source.
pub mod yields;

pub use calendar::{CalendarProvider, RestCalendar, DEFAULT_CALENDAR_API_URL};
pub use error::ProviderError;
pub use gas::{EtherscanGasOracle, GasProvider, DEFAULT_GAS_ORACLE_URL};
pub use notify::{LogSink, NotificationSink, TelegramSink};
pub use verify::{
    ContractReport, ContractUsage, ContractVerifier, EtherscanVerifier, DEFAULT_ETHERSCAN_API_URL,
};
pub use yields::{StaticYieldCatalog, YieldSource};

/// Time budget for any single provider request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
