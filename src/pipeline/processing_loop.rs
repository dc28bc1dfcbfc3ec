//! Periodic analytics scheduler.
//!
//! Runs once at startup, then every `interval` until cancelled. A failed run
//! is logged and the loop keeps going; the next tick recomputes from scratch.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::coordinator::AnalyticsRunner;

pub async fn run_scheduler(runner: Arc<AnalyticsRunner>, interval: Duration, cancel: CancellationToken) {
    info!(interval_secs = interval.as_secs(), "Analytics scheduler started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(e) = runner.run_once().await {
                    warn!(error = %e, "Scheduled analytics run failed, retrying next interval");
                }
            }
        }
    }

    info!("Analytics scheduler stopped");
}
