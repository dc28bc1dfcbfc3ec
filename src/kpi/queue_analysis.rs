//! Queue/Bottleneck Analyzer
//!
//! Groups phase records by phase name and flags groups whose average queue
//! delay is strictly above `mean + sample std` of all group averages.

use std::collections::BTreeMap;

use crate::kpi::stats::{max, mean, round_aggregate, sample_std, saturating_total};
use crate::types::{PhaseMetricRecord, QueueAnalysisRecord};

/// One record per distinct phase name, sorted by name.
pub fn analyze_queues(phases: &[PhaseMetricRecord]) -> Vec<QueueAnalysisRecord> {
    let mut groups: BTreeMap<&str, Vec<&PhaseMetricRecord>> = BTreeMap::new();
    for phase in phases {
        groups.entry(phase.phase_name.as_str()).or_default().push(phase);
    }

    let mut records: Vec<QueueAnalysisRecord> = groups
        .into_iter()
        .map(|(name, members)| {
            let delays: Vec<f64> = members.iter().filter_map(|p| p.queue_delay_hours).collect();
            QueueAnalysisRecord {
                phase_name: name.to_string(),
                avg_queue_delay: mean(&delays).map(round_aggregate),
                queue_delay_std: sample_std(&delays).map(round_aggregate),
                max_queue_delay: max(&delays).map(round_aggregate),
                total_jobs: members.len(),
                total_quantity: saturating_total(members.iter().map(|p| p.declared_quantity)),
                is_bottleneck: false,
            }
        })
        .collect();

    flag_bottlenecks(&mut records);
    records
}

/// Global outlier threshold over the defined group averages.
///
/// `None` when fewer than two groups have an average.
pub fn bottleneck_threshold(records: &[QueueAnalysisRecord]) -> Option<f64> {
    let averages: Vec<f64> = records.iter().filter_map(|r| r.avg_queue_delay).collect();
    Some(mean(&averages)? + sample_std(&averages)?)
}

fn flag_bottlenecks(records: &mut [QueueAnalysisRecord]) {
    let Some(threshold) = bottleneck_threshold(records) else {
        return;
    };
    for record in records.iter_mut() {
        record.is_bottleneck = record.avg_queue_delay.is_some_and(|avg| avg > threshold);
    }
}
