//! Calendar synchronization for active positions.
//!
//! Keeps one live calendar event per active position via:
//! - Race-safe event creation and reference install
//! - Estimate refresh on already-synced events
//! - Event release when a position closes

mod reconciler;

pub use reconciler::*;
