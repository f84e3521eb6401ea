//! Background engine for claim tracking.
//!
//! This crate drives everything that runs on a clock or mid-dialog:
//! - Calendar reconciliation for active positions
//! - Scheduled jobs for gas alerts, claim reminders and security sweeps
//! - Guided intake for new positions and wallets

/// Shared handles and job tuning.
pub mod context;
/// Scheduler event dispatch.
pub mod engine;
/// Guided intake flows.
pub mod intake;
/// Scheduled background jobs.
pub mod jobs;
/// Task scheduling.
pub mod scheduler;
/// Calendar synchronization.
pub mod sync;

#[cfg(test)]
pub(crate) mod testkit;

pub use context::{AppContext, SchedulerConfig};
pub use engine::Engine;
pub use intake::{IntakeReply, IntakeState, PositionIntake, register_wallet};
pub use scheduler::{Schedule, ScheduleBuilder, ScheduledTask, Scheduler, TaskEvent};
pub use sync::{ReconcileError, ReconcileReport, Reconciler, UpcomingClaim};
