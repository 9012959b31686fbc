//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! ```text
//! Scheduler (EXPIRY_SWEEP_CRON)
//!     │
//!     └─► expire_due_listings()
//!             └─► For each listing past its TTL → expire + close pending offers
//! ```

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::listings::activities::expire_due_listings;
use crate::kernel::MarketplaceDeps;

/// Start the expiry sweep on `cron` (six fields, seconds first).
pub async fn start_scheduler(cron: &str, deps: MarketplaceDeps) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let expiry_job = Job::new_async(cron, move |_uuid, _lock| {
        let deps = deps.clone();
        Box::pin(async move {
            if let Err(e) = expire_due_listings(&deps).await {
                tracing::error!("Expiry sweep failed: {}", e);
            }
        })
    })?;

    scheduler.add(expiry_job).await?;
    scheduler.start().await?;

    tracing::info!(cron, "Scheduled tasks started (listing expiry sweep)");
    Ok(scheduler)
}
