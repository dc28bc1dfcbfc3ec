//! Shop-floor KPI analytics
//!
//! Derives operational KPIs from production orders (with their embedded
//! phases) and machine descriptors.
//!
//! ## Architecture
//!
//! - **acquisition**: decodes heterogeneous document encodings into canonical records
//! - **kpi**: the derivation pipeline (phase records, machine / queue / operator
//!   aggregation, order timeline, summary rollup)
//! - **storage**: CSV / JSON export and download bundles
//! - **pipeline**: document sources, run orchestration and the scheduler
//! - **api**: HTTP trigger, status and download endpoints

pub mod acquisition;
pub mod api;
pub mod config;
pub mod kpi;
pub mod pipeline;
pub mod storage;
pub mod types;

// Re-export configuration
pub use config::AnalyticsConfig;

// Re-export commonly used types
pub use types::{
    AnalyticsReport, Machine, MachineMetricRecord, OperatorPerformanceRecord, Order,
    OrderTimelineRecord, Phase, PhaseMetricRecord, QueueAnalysisRecord, Snapshot,
    SummaryStatistics, Tabular,
};

// Re-export the pipeline entry points
pub use kpi::derive_report;
pub use pipeline::{AnalyticsRunner, DocumentSource, JsonFileSource, RunStatus, StaticSource};
pub use storage::Exporter;
