//! Machine Aggregator: joins phase records to machines by name.

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::defaults::{STATUS_COMPLETED, STATUS_IN_PROGRESS, WORKDAY_MINUTES};
use crate::kpi::phase_metrics::split_operators;
use crate::kpi::stats::{defined, floor_days, mean, saturating_total};
use crate::types::{Machine, MachineMetricRecord, PhaseMetricRecord};

/// One record per machine with at least one matching phase, in machine input order.
pub fn calculate_machine_metrics(
    phases: &[PhaseMetricRecord],
    machines: &[Machine],
) -> Vec<MachineMetricRecord> {
    machines
        .iter()
        .filter_map(|machine| {
            let matched: Vec<&PhaseMetricRecord> =
                phases.iter().filter(|p| p.phase_name == machine.name).collect();
            if matched.is_empty() {
                debug!(machine = %machine.name, "No phases matched, skipping machine");
                return None;
            }
            Some(machine_record(machine, &matched))
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn machine_record(machine: &Machine, matched: &[&PhaseMetricRecord]) -> MachineMetricRecord {
    let cycle_times: Vec<f64> = matched.iter().map(|p| p.cycle_time as f64).collect();
    let avg_cycle_time = mean(&cycle_times).unwrap_or(0.0);
    let avg_actual_duration = mean(&defined(matched.iter().map(|p| p.actual_duration_minutes)));

    let unique_operators: BTreeSet<String> =
        matched.iter().flat_map(|p| split_operators(&p.operators)).collect();

    MachineMetricRecord {
        machine_name: machine.name.clone(),
        is_active: machine.is_active,
        queue_target_time: machine.queue_target_time,
        current_queue_length: machine.current_queue_length,
        total_phases_processed: matched.len(),
        completed_phases: matched.iter().filter(|p| p.phase_status == STATUS_COMPLETED).count(),
        in_progress_phases: matched
            .iter()
            .filter(|p| STATUS_IN_PROGRESS.contains(&p.phase_status))
            .count(),
        avg_cycle_time,
        avg_actual_duration,
        avg_queue_delay: mean(&defined(matched.iter().map(|p| p.queue_delay_hours))),
        avg_finish_delay: mean(&defined(matched.iter().map(|p| p.finish_delay_hours))),
        total_quantity_processed: saturating_total(matched.iter().map(|p| p.declared_quantity)),
        unique_operators: unique_operators.len(),
        efficiency_percentage: efficiency(avg_cycle_time, avg_actual_duration),
        utilization_percentage: utilization(matched),
    }
}

fn efficiency(avg_cycle_time: f64, avg_actual_duration: Option<f64>) -> Option<f64> {
    let actual = avg_actual_duration?;
    if avg_cycle_time <= 0.0 || actual == 0.0 {
        return None;
    }
    Some(avg_cycle_time / actual * 100.0)
}

/// Share of 8-hour working days consumed by processing time.
///
/// The window ends at the latest real finish among completed phases but
/// starts at the earliest real queue insert among *all* matched phases, and
/// the minutes are summed over all matched phases too.
#[allow(clippy::cast_precision_loss)]
fn utilization(matched: &[&PhaseMetricRecord]) -> Option<f64> {
    let last_finish = matched.iter().filter_map(|p| p.real_finish_date).max()?;
    let first_start = matched.iter().filter_map(|p| p.queue_real_insert_date).min()?;

    let working_days = floor_days(last_finish - first_start);
    if working_days <= 0 {
        return None;
    }

    let total_minutes: f64 = matched.iter().filter_map(|p| p.actual_duration_minutes).sum();
    Some(total_minutes / (working_days as f64 * WORKDAY_MINUTES) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::Timestamp;
    use chrono::{Local, TimeDelta, TimeZone};

    fn t0() -> Timestamp {
        Local.timestamp_millis_opt(1_700_000_000_000).single().unwrap()
    }

    fn machine(name: &str) -> Machine {
        Machine {
            name: name.to_string(),
            is_active: true,
            queue_target_time: 30,
            current_queue_length: 2,
        }
    }

    fn phase(name: &str, status: i64, cycle: i64) -> PhaseMetricRecord {
        PhaseMetricRecord {
            phase_name: name.to_string(),
            phase_status: status,
            cycle_time: cycle,
            declared_quantity: 10,
            ..Default::default()
        }
    }

    fn timed(mut record: PhaseMetricRecord, start: Timestamp, finish: Option<Timestamp>) -> PhaseMetricRecord {
        record.queue_real_insert_date = Some(start);
        record.real_finish_date = finish;
        record.actual_duration_minutes =
            finish.map(|f| (f - start).num_milliseconds() as f64 / 60_000.0);
        record
    }

    #[test]
    fn test_single_matched_phase() {
        let t0 = t0();
        let mut record = timed(phase("M1", 4, 5), t0 + TimeDelta::hours(1), Some(t0 + TimeDelta::minutes(115)));
        record.queue_delay_hours = Some(1.0);

        let out = calculate_machine_metrics(&[record], &[machine("M1")]);
        assert_eq!(out.len(), 1);

        let m = &out[0];
        assert_eq!(m.machine_name, "M1");
        assert_eq!(m.total_phases_processed, 1);
        assert_eq!(m.completed_phases, 1);
        assert_eq!(m.in_progress_phases, 0);
        assert_eq!(m.avg_cycle_time, 5.0);
        assert_eq!(m.avg_actual_duration, Some(55.0));
        assert_eq!(m.avg_queue_delay, Some(1.0));
        assert_eq!(m.total_quantity_processed, 10);
        let eff = m.efficiency_percentage.unwrap();
        assert!((eff - 9.0909).abs() < 1e-3, "efficiency {}", eff);
        // 55 minutes inside a single day
        assert_eq!(m.utilization_percentage, None);
    }

    #[test]
    fn test_unmatched_machine_skipped_and_input_order_kept() {
        let phases = vec![phase("B", 4, 1), phase("A", 4, 1)];
        let machines = vec![machine("B"), machine("Z"), machine("A")];
        let names: Vec<_> = calculate_machine_metrics(&phases, &machines)
            .into_iter()
            .map(|m| m.machine_name)
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_name_match_is_exact() {
        let out = calculate_machine_metrics(&[phase("m1", 4, 1), phase("M1 ", 4, 1)], &[machine("M1")]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_status_buckets() {
        let phases = vec![phase("M", 4, 1), phase("M", 1, 1), phase("M", 3, 1), phase("M", 0, 1), phase("M", 9, 1)];
        let m = &calculate_machine_metrics(&phases, &[machine("M")])[0];
        assert_eq!(m.total_phases_processed, 5);
        assert_eq!(m.completed_phases, 1);
        assert_eq!(m.in_progress_phases, 2);
    }

    #[test]
    fn test_efficiency_null_without_durations_or_cycle() {
        let m = &calculate_machine_metrics(&[phase("M", 4, 5)], &[machine("M")])[0];
        assert_eq!(m.avg_actual_duration, None);
        assert_eq!(m.efficiency_percentage, None);

        assert_eq!(efficiency(0.0, Some(10.0)), None);
        assert_eq!(efficiency(5.0, Some(0.0)), None);
        assert_eq!(efficiency(5.0, Some(10.0)), Some(50.0));
    }

    #[test]
    fn test_unique_operators_union() {
        let mut a = phase("M", 4, 1);
        a.operators = "op1,op2".to_string();
        let mut b = phase("M", 4, 1);
        b.operators = "op2,op3,op3".to_string();

        let m = &calculate_machine_metrics(&[a, b], &[machine("M")])[0];
        assert_eq!(m.unique_operators, 3);
    }

    #[test]
    fn test_comma_in_operator_id_counts_each_token() {
        let order = crate::types::Order {
            phases: vec![crate::types::Phase {
                phase_name: "M1".to_string(),
                operators: vec!["a,b".to_string(), " ".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        };
        let phases = crate::kpi::phase_metrics::extract_phase_metrics(&[order]);

        let m = &calculate_machine_metrics(&phases, &[machine("M1")])[0];
        let operators = crate::kpi::operator_performance::aggregate_operator_performance(&phases);
        assert_eq!(phases[0].operators, "a,b");
        assert_eq!(m.unique_operators, 2);
        assert_eq!(m.unique_operators, operators.len());
    }

    #[test]
    fn test_huge_quantities_saturate() {
        let mut a = phase("M", 4, 1);
        a.declared_quantity = i64::MAX;
        let mut b = phase("M", 4, 1);
        b.declared_quantity = i64::MAX;

        let m = &calculate_machine_metrics(&[a, b], &[machine("M")])[0];
        assert_eq!(m.total_quantity_processed, i64::MAX);
    }

    #[test]
    fn test_utilization_null_without_completed_phase() {
        let t0 = t0();
        let record = timed(phase("M", 2, 1), t0, None);
        let m = &calculate_machine_metrics(&[record], &[machine("M")])[0];
        assert_eq!(m.utilization_percentage, None);
    }

    #[test]
    fn test_utilization_over_multiple_days() {
        let t0 = t0();
        // Two days window, 480 + 240 minutes of processing
        let first = timed(phase("M", 4, 1), t0, Some(t0 + TimeDelta::minutes(480)));
        let second = timed(
            phase("M", 4, 1),
            t0 + TimeDelta::hours(48) - TimeDelta::minutes(240),
            Some(t0 + TimeDelta::hours(48)),
        );

        let m = &calculate_machine_metrics(&[first, second], &[machine("M")])[0];
        let util = m.utilization_percentage.unwrap();
        assert!((util - 75.0).abs() < 1e-9, "utilization {}", util);
    }

    #[test]
    fn test_utilization_window_start_uses_all_phases() {
        let t0 = t0();
        let finished = timed(phase("M", 4, 1), t0 + TimeDelta::hours(47), Some(t0 + TimeDelta::hours(48)));
        // Unfinished phase queued earlier still opens the window
        let mut pending = phase("M", 2, 1);
        pending.queue_real_insert_date = Some(t0);

        let m = &calculate_machine_metrics(&[finished, pending], &[machine("M")])[0];
        let util = m.utilization_percentage.unwrap();
        assert!((util - 60.0 / 960.0 * 100.0).abs() < 1e-9, "utilization {}", util);
    }

    #[test]
    fn test_utilization_null_for_negative_window() {
        let t0 = t0();
        let mut record = phase("M", 4, 1);
        record.queue_real_insert_date = Some(t0 + TimeDelta::hours(72));
        record.real_finish_date = Some(t0);

        let m = &calculate_machine_metrics(&[record], &[machine("M")])[0];
        assert_eq!(m.utilization_percentage, None);
    }
}
