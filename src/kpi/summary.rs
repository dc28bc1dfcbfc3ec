//! Summary Rollup

use crate::config::defaults::STATUS_COMPLETED;
use crate::kpi::stats::{defined, mean};
use crate::types::{
    Machine, MachineMetricRecord, OperatorPerformanceRecord, Order, OrderTimelineRecord,
    QueueAnalysisRecord, SummaryStatistics,
};

/// Inputs the rollup reads, borrowed from one run.
#[derive(Debug, Clone, Copy)]
pub struct SummaryInputs<'a> {
    pub orders: &'a [Order],
    pub machines: &'a [Machine],
    pub machine_metrics: &'a [MachineMetricRecord],
    pub order_timeline: &'a [OrderTimelineRecord],
    pub queue_analysis: &'a [QueueAnalysisRecord],
    pub operator_performance: &'a [OperatorPerformanceRecord],
}

#[allow(clippy::cast_precision_loss)]
pub fn build_summary(inputs: &SummaryInputs<'_>) -> SummaryStatistics {
    let lead_times = defined(inputs.order_timeline.iter().map(|r| r.lead_time_days.map(|d| d as f64)));

    let on_time_flags: Vec<bool> = inputs.order_timeline.iter().filter_map(|r| r.on_time).collect();
    // 0 rather than null when no order can be classified
    let on_time_delivery_rate = if on_time_flags.is_empty() {
        0.0
    } else {
        let on_time = on_time_flags.iter().filter(|f| **f).count();
        on_time as f64 / on_time_flags.len() as f64 * 100.0
    };

    SummaryStatistics {
        total_orders: inputs.orders.len(),
        completed_orders: inputs
            .orders
            .iter()
            .filter(|o| o.order_status == STATUS_COMPLETED)
            .count(),
        active_machines: inputs.machines.iter().filter(|m| m.is_active).count(),
        total_machines: inputs.machines.len(),
        avg_order_lead_time: mean(&lead_times),
        on_time_delivery_rate,
        avg_machine_utilization: mean(&defined(
            inputs.machine_metrics.iter().map(|m| m.utilization_percentage),
        )),
        avg_machine_efficiency: mean(&defined(
            inputs.machine_metrics.iter().map(|m| m.efficiency_percentage),
        )),
        total_operators: inputs.operator_performance.len(),
        bottleneck_machines: inputs
            .queue_analysis
            .iter()
            .filter(|q| q.is_bottleneck)
            .map(|q| q.phase_name.clone())
            .collect(),
    }
}
