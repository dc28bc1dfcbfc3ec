//! Run orchestration: snapshot -> derivation -> export -> status.
//!
//! A run either publishes all six artifacts from one snapshot or fails as a
//! whole. Concurrent triggers (scheduler tick, HTTP request) are serialized on
//! an async mutex; the pipeline itself never sees the status.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::Local;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::source::{DocumentSource, SourceError};
use super::state::RunStatus;
use crate::kpi;
use crate::storage::{ExportError, Exporter};
use crate::types::SummaryStatistics;

/// Why a run failed.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("document source failed: {0}")]
    Source(#[from] SourceError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
    #[error("analytics task aborted: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Owns the source, the exporter and the published [`RunStatus`].
pub struct AnalyticsRunner {
    source: Box<dyn DocumentSource>,
    exporter: Exporter,
    status: ArcSwap<RunStatus>,
    run_lock: Mutex<()>,
}

impl AnalyticsRunner {
    pub fn new(source: Box<dyn DocumentSource>, exporter: Exporter) -> Self {
        Self {
            source,
            exporter,
            status: ArcSwap::from_pointee(RunStatus::default()),
            run_lock: Mutex::new(()),
        }
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    /// Current status snapshot.
    pub fn status(&self) -> Arc<RunStatus> {
        self.status.load_full()
    }

    /// Execute one full run, waiting for any run already in progress.
    pub async fn run_once(&self) -> Result<SummaryStatistics, RunError> {
        let _guard = self.run_lock.lock().await;

        let started = Local::now();
        self.status.store(Arc::new(self.status.load().started(started)));
        info!(source = self.source.source_name(), "Analytics run started");

        match self.execute().await {
            Ok(summary) => {
                let finished = Local::now();
                self.status
                    .store(Arc::new(self.status.load().succeeded(finished, summary.clone())));
                info!(
                    elapsed_ms = (finished - started).num_milliseconds(),
                    total_orders = summary.total_orders,
                    bottlenecks = summary.bottleneck_machines.len(),
                    "Analytics run succeeded"
                );
                Ok(summary)
            }
            Err(e) => {
                self.status
                    .store(Arc::new(self.status.load().failed(Local::now(), e.to_string())));
                warn!(error = %e, "Analytics run failed");
                Err(e)
            }
        }
    }

    async fn execute(&self) -> Result<SummaryStatistics, RunError> {
        let snapshot = self.source.fetch_snapshot().await?;
        info!(
            orders = snapshot.orders.len(),
            phases = snapshot.phase_count(),
            machines = snapshot.machines.len(),
            "Snapshot fetched"
        );

        let exporter = self.exporter.clone();
        let summary = tokio::task::spawn_blocking(move || -> Result<SummaryStatistics, ExportError> {
            let report = kpi::derive_report(&snapshot);
            exporter.export(&report)?;
            Ok(report.summary)
        })
        .await??;

        Ok(summary)
    }
}
