//! Run pipeline
//!
//! ```text
//! DocumentSource ──► kpi::derive_report ──► Exporter
//!        ▲                                    │
//!   AnalyticsRunner (serialized runs) ◄───────┘ RunStatus
//!        ▲
//!   run_scheduler / HTTP trigger
//! ```

mod coordinator;
mod state;
pub mod processing_loop;
pub mod source;

pub use coordinator::{AnalyticsRunner, RunError};
pub use processing_loop::run_scheduler;
pub use source::{DocumentSource, JsonFileSource, SourceError, StaticSource};
pub use state::{RunState, RunStatus};
