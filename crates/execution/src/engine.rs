//! Background engine wiring the scheduler to the jobs.

use crate::context::AppContext;
use crate::jobs::gas::GasThresholdJob;
use crate::jobs::{self, CLAIMS_TASK, GAS_TASK, SECURITY_TASK};
use crate::scheduler::{ScheduleBuilder, ScheduledTask, Scheduler, TaskEvent};
use claim_tracker_domain::value_objects::GasSample;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Engine running the standard job schedule:
/// gas check hourly, claim reminders daily at 09:00 UTC, security sweep
/// every six hours.
pub struct Engine {
    /// Shared handles and tuning.
    ctx: AppContext,
    /// Stateful gas job (history + cooldown ledger).
    gas_job: GasThresholdJob,
    /// Rolling gas history, also handed out to readers.
    history: Arc<RwLock<Vec<GasSample>>>,
}

impl Engine {
    /// Creates an engine over a context.
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        let history = Arc::new(RwLock::new(Vec::new()));
        let gas_job = GasThresholdJob::new(Arc::clone(&history));
        Self {
            ctx,
            gas_job,
            history,
        }
    }

    /// Shared gas sample history, fed by the hourly job.
    #[must_use]
    pub fn gas_history(&self) -> Arc<RwLock<Vec<GasSample>>> {
        Arc::clone(&self.history)
    }

    /// Runs the standard schedule until the event channel closes.
    pub async fn run(self) {
        let mut scheduler = Scheduler::new();
        scheduler.add_task(ScheduledTask::new(GAS_TASK, ScheduleBuilder::every_hours(1)));
        scheduler.add_task(ScheduledTask::new(CLAIMS_TASK, ScheduleBuilder::daily_at(9, 0)));
        scheduler.add_task(ScheduledTask::new(
            SECURITY_TASK,
            ScheduleBuilder::every_hours(6),
        ));

        let Some(mut events) = scheduler.take_receiver() else {
            return;
        };
        tokio::spawn(async move { scheduler.start().await });

        info!("Engine started");
        while let Some(event) = events.recv().await {
            self.dispatch(event).await;
        }
        info!("Engine stopped");
    }

    /// Runs the job matching an event under the configured timeout. A
    /// timeout or error is logged at this boundary and the engine keeps
    /// going.
    async fn dispatch(&self, event: TaskEvent) {
        debug!(task = %event.task_name, "Dispatching job");
        let timeout = self.ctx.config.job_timeout;

        let outcome = match event.task_name.as_str() {
            GAS_TASK => tokio::time::timeout(timeout, self.gas_job.run(&self.ctx)).await,
            CLAIMS_TASK => tokio::time::timeout(timeout, jobs::claims::run(&self.ctx)).await,
            SECURITY_TASK => tokio::time::timeout(timeout, jobs::security::run(&self.ctx)).await,
            other => {
                warn!(task = other, "No job registered for task");
                return;
            }
        };

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(task = %event.task_name, error = %e, "Job failed"),
            Err(_) => warn!(
                task = %event.task_name,
                timeout_secs = timeout.as_secs(),
                "Job timed out"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::test_context;
    use claim_tracker_domain::enums::AlertKind;
    use claim_tracker_domain::value_objects::GasPrices;
    use tokio::time::Instant;

    fn event_for(task: &str) -> TaskEvent {
        TaskEvent {
            task_name: task.to_string(),
            scheduled_at: Instant::now(),
            triggered_at: Instant::now(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_runs_gas_job() {
        let (ctx, sink, _) = test_context(GasPrices::new(10, 20, 35)).await;
        let user = ctx.db.users().upsert_by_platform_id(42, "carol").await.unwrap();
        ctx.db
            .alerts()
            .upsert(user.id, AlertKind::Gas, "{}")
            .await
            .unwrap();

        let engine = Engine::new(ctx);
        engine.dispatch(event_for(GAS_TASK)).await;

        assert_eq!(sink.messages(), vec![(42, "Low gas prices: 20 Gwei".to_string())]);
        assert_eq!(engine.gas_history().read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_ignores_unknown_task() {
        let (ctx, sink, _) = test_context(GasPrices::FALLBACK).await;
        let engine = Engine::new(ctx);
        engine.dispatch(event_for("no-such-task")).await;
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_survives_job_errors() {
        // A claims run against a context with no users succeeds; the
        // interesting case is a security run, which never errors even
        // without a verifier.
        let (ctx, _, _) = test_context(GasPrices::FALLBACK).await;
        let engine = Engine::new(ctx);
        engine.dispatch(event_for(SECURITY_TASK)).await;
        engine.dispatch(event_for(CLAIMS_TASK)).await;
    }
}
