//! Upcoming-claims job: daily reminders from synced calendar events.

use crate::context::AppContext;
use tracing::{info, warn};

/// Runs one reminder cycle: every user's claims due within the configured
/// lookahead are delivered through the sink. Per-user failures are logged
/// and skipped so one bad calendar read never starves the rest.
///
/// # Errors
/// Returns an error if the user list cannot be read.
pub async fn run(ctx: &AppContext) -> anyhow::Result<()> {
    info!("Checking upcoming yield claims...");

    let users = ctx.db.users().list_all().await?;
    let reconciler = ctx.reconciler();
    let mut notified = 0usize;

    for user in users {
        let claims = match reconciler
            .upcoming_claims(user.id, ctx.config.claims_lookahead)
            .await
        {
            Ok(claims) => claims,
            Err(e) => {
                warn!(user = user.platform_id, error = %e, "Failed to read upcoming claims");
                continue;
            }
        };

        for claim in claims {
            let text = format!(
                "Upcoming yield claim: {} {} on {}",
                claim.protocol, claim.asset, claim.claim_date
            );
            match ctx.notifier.notify(user.platform_id, &text).await {
                Ok(()) => notified += 1,
                Err(e) => {
                    warn!(user = user.platform_id, error = %e, "Failed to deliver claim reminder");
                }
            }
        }
    }

    info!(notified, "Upcoming claims check complete");
    Ok(())
}
