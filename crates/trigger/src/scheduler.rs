//! Recurring invocation of the orchestrator.
//!
//! Intended to be spawned via `tokio::spawn` and stopped with a
//! [`CancellationToken`]. A run that has started is always awaited to
//! completion, so shutdown never abandons targets mid-flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::orchestrator::Orchestrator;

/// Run the trigger loop until `cancel` is triggered.
///
/// The first run starts immediately. If a run outlasts the interval, the
/// missed ticks are skipped rather than queued.
pub async fn run(orchestrator: Arc<Orchestrator>, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        interval_secs = interval.as_secs(),
        timeout_ms = orchestrator.timeout().as_millis() as u64,
        "Trigger scheduler started",
    );

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Trigger scheduler shutting down");
                break;
            }
            _ = ticker.tick() => {
                tracing::debug!(tick_at = %chrono::Utc::now().to_rfc3339(), "Scheduler tick");
                match orchestrator.spawn_run().await {
                    Ok(Ok(report)) => {
                        tracing::debug!(
                            run_id = %report.run_id,
                            duration_ms = report.duration_ms,
                            "Scheduled run settled",
                        );
                    }
                    // Already logged inside the run.
                    Ok(Err(_)) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Scheduled run task failed");
                    }
                }
            }
        }
    }
}
