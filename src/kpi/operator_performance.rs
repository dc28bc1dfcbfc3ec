//! Operator Performance Aggregator
//!
//! A phase can be worked by several operators, so phase records are first
//! exploded into one [`OperatorAssignment`] per (phase, operator) pair and then
//! grouped by operator id.

use std::collections::BTreeMap;

use crate::kpi::phase_metrics::split_operators;
use crate::kpi::stats::{defined, mean, round_aggregate, saturating_total};
use crate::types::{OperatorPerformanceRecord, PhaseMetricRecord};

/// One operator's share of one phase.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorAssignment {
    pub operator: String,
    pub phase_name: String,
    pub cycle_time: i64,
    pub actual_duration_minutes: Option<f64>,
    pub declared_quantity: i64,
    pub phase_status: i64,
}

/// Explode each record's joined operator string into per-operator rows.
pub fn explode_operators(phases: &[PhaseMetricRecord]) -> Vec<OperatorAssignment> {
    phases
        .iter()
        .flat_map(|phase| {
            split_operators(&phase.operators)
                .into_iter()
                .map(move |operator| OperatorAssignment {
                    operator,
                    phase_name: phase.phase_name.clone(),
                    cycle_time: phase.cycle_time,
                    actual_duration_minutes: phase.actual_duration_minutes,
                    declared_quantity: phase.declared_quantity,
                    phase_status: phase.phase_status,
                })
        })
        .collect()
}

/// One record per operator id, sorted by id.
pub fn aggregate_operator_performance(phases: &[PhaseMetricRecord]) -> Vec<OperatorPerformanceRecord> {
    let assignments = explode_operators(phases);

    let mut by_operator: BTreeMap<&str, Vec<&OperatorAssignment>> = BTreeMap::new();
    for assignment in &assignments {
        by_operator.entry(assignment.operator.as_str()).or_default().push(assignment);
    }

    by_operator
        .into_iter()
        .map(|(operator, rows)| operator_record(operator, &rows))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn operator_record(operator: &str, rows: &[&OperatorAssignment]) -> OperatorPerformanceRecord {
    let cycle_times: Vec<f64> = rows.iter().map(|r| r.cycle_time as f64).collect();
    let avg_cycle_time = mean(&cycle_times).map_or(0.0, round_aggregate);
    let avg_actual_duration =
        mean(&defined(rows.iter().map(|r| r.actual_duration_minutes))).map(round_aggregate);

    let efficiency = avg_actual_duration
        .filter(|actual| *actual != 0.0)
        .map(|actual| round_aggregate(avg_cycle_time / actual * 100.0));

    OperatorPerformanceRecord {
        operator: operator.to_string(),
        total_phases: rows.len(),
        avg_cycle_time,
        avg_actual_duration,
        total_quantity: saturating_total(rows.iter().map(|r| r.declared_quantity)),
        efficiency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(operators: &str, cycle: i64, actual: Option<f64>, quantity: i64) -> PhaseMetricRecord {
        PhaseMetricRecord {
            phase_name: "M1".to_string(),
            phase_status: 4,
            operators: operators.to_string(),
            cycle_time: cycle,
            actual_duration_minutes: actual,
            declared_quantity: quantity,
            ..Default::default()
        }
    }

    #[test]
    fn test_explode_one_row_per_operator() {
        let rows = explode_operators(&[phase("op1, op2,,op1", 5, Some(10.0), 3)]);
        let ops: Vec<_> = rows.iter().map(|r| r.operator.as_str()).collect();
        assert_eq!(ops, vec!["op1", "op2", "op1"]);
        assert!(rows.iter().all(|r| r.cycle_time == 5 && r.declared_quantity == 3));
        assert_eq!(rows[0].actual_duration_minutes, Some(10.0));
        assert_eq!(rows[0].phase_status, 4);
    }

    #[test]
    fn test_aggregate_per_operator() {
        let phases = vec![
            phase("alice,bob", 5, Some(10.0), 4),
            phase("alice", 7, Some(20.0), 6),
            phase("bob", 3, None, 1),
        ];
        let out = aggregate_operator_performance(&phases);
        assert_eq!(out.len(), 2);

        let alice = &out[0];
        assert_eq!(alice.operator, "alice");
        assert_eq!(alice.total_phases, 2);
        assert_eq!(alice.avg_cycle_time, 6.0);
        assert_eq!(alice.avg_actual_duration, Some(15.0));
        assert_eq!(alice.total_quantity, 10);
        assert_eq!(alice.efficiency, Some(40.0));

        let bob = &out[1];
        assert_eq!(bob.total_phases, 2);
        assert_eq!(bob.avg_cycle_time, 4.0);
        assert_eq!(bob.avg_actual_duration, Some(10.0));
        assert_eq!(bob.total_quantity, 5);
        assert_eq!(bob.efficiency, Some(40.0));
    }

    #[test]
    fn test_efficiency_guarded() {
        let out = aggregate_operator_performance(&[phase("x", 5, None, 1), phase("y", 5, Some(0.0), 1)]);
        assert_eq!(out[0].efficiency, None);
        assert_eq!(out[1].avg_actual_duration, Some(0.0));
        assert_eq!(out[1].efficiency, None);
    }

    #[test]
    fn test_efficiency_from_rounded_means() {
        // cycle mean 10, actual mean 3.333 -> 3.33, efficiency 300.3
        let out = aggregate_operator_performance(&[
            phase("x", 10, Some(3.0), 1),
            phase("x", 10, Some(3.0), 1),
            phase("x", 10, Some(4.0), 1),
        ]);
        assert_eq!(out[0].avg_actual_duration, Some(3.33));
        assert_eq!(out[0].efficiency, Some(300.3));
    }

    #[test]
    fn test_case_sensitive_ids() {
        let out = aggregate_operator_performance(&[phase("Op,op", 1, None, 1)]);
        let ops: Vec<_> = out.iter().map(|r| r.operator.as_str()).collect();
        assert_eq!(ops, vec!["Op", "op"]);
    }

    #[test]
    fn test_total_quantity_saturates() {
        let out = aggregate_operator_performance(&[phase("ann", 1, None, i64::MAX), phase("ann", 1, None, 1)]);
        assert_eq!(out[0].total_quantity, i64::MAX);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_operator_performance(&[]).is_empty());
        assert!(aggregate_operator_performance(&[phase("", 1, None, 1)]).is_empty());
    }
}
