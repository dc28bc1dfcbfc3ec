//! Phase Extractor: one [`PhaseMetricRecord`] per (order, phase) pair.

use crate::config::defaults::OPERATOR_SEPARATOR;
use crate::kpi::stats::{hours_between, minutes_between};
use crate::types::{Order, Phase, PhaseMetricRecord};

/// Flatten every order's phase list into derived phase records.
///
/// Records follow order input order, then phase order within each order.
pub fn extract_phase_metrics(orders: &[Order]) -> Vec<PhaseMetricRecord> {
    orders
        .iter()
        .flat_map(|order| order.phases.iter().map(move |phase| phase_record(order, phase)))
        .collect()
}

fn phase_record(order: &Order, phase: &Phase) -> PhaseMetricRecord {
    let operator_ids = clean_operators(&phase.operators);

    PhaseMetricRecord {
        order_id: order.order_id.clone(),
        order_status: order.order_status,
        order_quantity: order.quantity,
        phase_id: phase.phase_id.clone(),
        phase_name: phase.phase_name.clone(),
        phase_status: phase.phase_status,
        cycle_time: phase.cycle_time,
        phase_real_time: phase.phase_real_time,
        declared_quantity: phase.declared_quantity,
        operators: join_operators(&operator_ids),
        operator_count: operator_ids.len(),
        queue_insert_date: phase.queue_insert_date,
        queue_real_insert_date: phase.queue_real_insert_date,
        planned_finish_date: phase.planned_finish_date,
        real_finish_date: phase.real_finish_date,
        queue_delay_hours: hours_between(phase.queue_insert_date, phase.queue_real_insert_date),
        finish_delay_hours: hours_between(phase.planned_finish_date, phase.real_finish_date),
        actual_duration_minutes: minutes_between(phase.queue_real_insert_date, phase.real_finish_date),
        planned_duration_minutes: planned_duration(phase.cycle_time, phase.declared_quantity),
    }
}

/// `cycle_time × declared_quantity`, or bare `cycle_time` when nothing was declared.
pub const fn planned_duration(cycle_time: i64, declared_quantity: i64) -> i64 {
    if declared_quantity > 0 {
        cycle_time.saturating_mul(declared_quantity)
    } else {
        cycle_time
    }
}

/// Trimmed, non-empty ids in original order, duplicates kept.
fn clean_operators(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|op| op.trim())
        .filter(|op| !op.is_empty())
        .map(str::to_owned)
        .collect()
}

fn join_operators(ids: &[String]) -> String {
    ids.join(OPERATOR_SEPARATOR.to_string().as_str())
}

/// Split a joined operator string back into trimmed, non-empty ids.
pub fn split_operators(joined: &str) -> Vec<String> {
    joined
        .split(OPERATOR_SEPARATOR)
        .map(str::trim)
        .filter(|op| !op.is_empty())
        .map(str::to_owned)
        .collect()
}
