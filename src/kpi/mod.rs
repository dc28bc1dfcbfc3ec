//! Metrics derivation pipeline
//!
//! Pure, synchronous transforms from one immutable [`Snapshot`] to an
//! [`AnalyticsReport`]:
//!
//! ```text
//! orders ──► phase_metrics ──┬──► machine_metrics
//!   │                        ├──► queue_analysis
//!   │                        └──► operator_performance
//!   └──────► order_timeline
//!                  all five ───► summary
//! ```
//!
//! The phase-set aggregators only read the shared phase records, so they run
//! on the rayon pool next to the timeline builder.

pub mod machine_metrics;
pub mod operator_performance;
pub mod order_timeline;
pub mod phase_metrics;
pub mod queue_analysis;
pub mod stats;
pub mod summary;

pub use machine_metrics::calculate_machine_metrics;
pub use operator_performance::{aggregate_operator_performance, explode_operators, OperatorAssignment};
pub use order_timeline::build_order_timeline;
pub use phase_metrics::{extract_phase_metrics, split_operators};
pub use queue_analysis::{analyze_queues, bottleneck_threshold};
pub use summary::{build_summary, SummaryInputs};

use tracing::debug;

use crate::types::{AnalyticsReport, Snapshot};

/// Derive all six outputs from one snapshot.
pub fn derive_report(snapshot: &Snapshot) -> AnalyticsReport {
    let phase_metrics = extract_phase_metrics(&snapshot.orders);
    debug!(phases = phase_metrics.len(), "Phase records extracted");

    let ((machine_metrics, queue_analysis), (operator_performance, order_timeline)) = rayon::join(
        || {
            rayon::join(
                || calculate_machine_metrics(&phase_metrics, &snapshot.machines),
                || analyze_queues(&phase_metrics),
            )
        },
        || {
            rayon::join(
                || aggregate_operator_performance(&phase_metrics),
                || build_order_timeline(&snapshot.orders),
            )
        },
    );
    debug!(
        machines = machine_metrics.len(),
        phase_groups = queue_analysis.len(),
        operators = operator_performance.len(),
        orders = order_timeline.len(),
        "Aggregations complete"
    );

    let summary = build_summary(&SummaryInputs {
        orders: &snapshot.orders,
        machines: &snapshot.machines,
        machine_metrics: &machine_metrics,
        order_timeline: &order_timeline,
        queue_analysis: &queue_analysis,
        operator_performance: &operator_performance,
    });

    AnalyticsReport {
        phase_metrics,
        machine_metrics,
        order_timeline,
        queue_analysis,
        operator_performance,
        summary,
    }
}
