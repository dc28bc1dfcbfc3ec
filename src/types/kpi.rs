//! Derived KPI records: the five tabular views and the run summary.
//!
//! Column names and their order are a contract with dashboard consumers.
//! Every record's serde field order matches its [`Tabular::COLUMNS`]; a null
//! metric is `None`, never a zero stand-in.

use serde::{Deserialize, Serialize};

use crate::acquisition::Timestamp;

/// A flat record exported as one table row.
pub trait Tabular: Serialize {
    /// Table file stem, e.g. `phase_metrics`.
    const TABLE: &'static str;
    /// Header row, in serialization order.
    const COLUMNS: &'static [&'static str];
}

// ============================================================================
// Phase Metrics
// ============================================================================

/// One phase instance with its derived interval fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseMetricRecord {
    pub order_id: String,
    pub order_status: i64,
    pub order_quantity: i64,
    pub phase_id: String,
    pub phase_name: String,
    pub phase_status: i64,
    pub cycle_time: i64,
    pub phase_real_time: i64,
    pub declared_quantity: i64,
    /// Trimmed, non-empty operator ids joined with `,` in original order.
    pub operators: String,
    pub operator_count: usize,
    pub queue_insert_date: Option<Timestamp>,
    pub queue_real_insert_date: Option<Timestamp>,
    pub planned_finish_date: Option<Timestamp>,
    pub real_finish_date: Option<Timestamp>,
    pub queue_delay_hours: Option<f64>,
    pub finish_delay_hours: Option<f64>,
    pub actual_duration_minutes: Option<f64>,
    pub planned_duration_minutes: i64,
}

impl Tabular for PhaseMetricRecord {
    const TABLE: &'static str = "phase_metrics";
    const COLUMNS: &'static [&'static str] = &[
        "order_id",
        "order_status",
        "order_quantity",
        "phase_id",
        "phase_name",
        "phase_status",
        "cycle_time",
        "phase_real_time",
        "declared_quantity",
        "operators",
        "operator_count",
        "queue_insert_date",
        "queue_real_insert_date",
        "planned_finish_date",
        "real_finish_date",
        "queue_delay_hours",
        "finish_delay_hours",
        "actual_duration_minutes",
        "planned_duration_minutes",
    ];
}

// ============================================================================
// Machine Metrics
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineMetricRecord {
    pub machine_name: String,
    pub is_active: bool,
    pub queue_target_time: i64,
    pub current_queue_length: usize,
    pub total_phases_processed: usize,
    pub completed_phases: usize,
    pub in_progress_phases: usize,
    pub avg_cycle_time: f64,
    pub avg_actual_duration: Option<f64>,
    pub avg_queue_delay: Option<f64>,
    pub avg_finish_delay: Option<f64>,
    pub total_quantity_processed: i64,
    pub unique_operators: usize,
    pub efficiency_percentage: Option<f64>,
    pub utilization_percentage: Option<f64>,
}

impl Tabular for MachineMetricRecord {
    const TABLE: &'static str = "machine_metrics";
    const COLUMNS: &'static [&'static str] = &[
        "machine_name",
        "is_active",
        "queue_target_time",
        "current_queue_length",
        "total_phases_processed",
        "completed_phases",
        "in_progress_phases",
        "avg_cycle_time",
        "avg_actual_duration",
        "avg_queue_delay",
        "avg_finish_delay",
        "total_quantity_processed",
        "unique_operators",
        "efficiency_percentage",
        "utilization_percentage",
    ];
}

// ============================================================================
// Order Timeline
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderTimelineRecord {
    pub order_id: String,
    pub article_code: String,
    pub product_family: String,
    pub quantity: i64,
    pub priority: i64,
    pub order_status: i64,
    pub insert_date: Option<Timestamp>,
    pub start_date: Option<Timestamp>,
    pub deadline: Option<Timestamp>,
    pub real_finish_date: Option<Timestamp>,
    pub lead_time_days: Option<i64>,
    pub delay_days: Option<i64>,
    pub on_time: Option<bool>,
}

impl Tabular for OrderTimelineRecord {
    const TABLE: &'static str = "order_timeline";
    const COLUMNS: &'static [&'static str] = &[
        "order_id",
        "article_code",
        "product_family",
        "quantity",
        "priority",
        "order_status",
        "insert_date",
        "start_date",
        "deadline",
        "real_finish_date",
        "lead_time_days",
        "delay_days",
        "on_time",
    ];
}

// ============================================================================
// Queue Analysis
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueAnalysisRecord {
    pub phase_name: String,
    pub avg_queue_delay: Option<f64>,
    pub queue_delay_std: Option<f64>,
    pub max_queue_delay: Option<f64>,
    pub total_jobs: usize,
    pub total_quantity: i64,
    pub is_bottleneck: bool,
}

impl Tabular for QueueAnalysisRecord {
    const TABLE: &'static str = "queue_analysis";
    const COLUMNS: &'static [&'static str] = &[
        "phase_name",
        "avg_queue_delay",
        "queue_delay_std",
        "max_queue_delay",
        "total_jobs",
        "total_quantity",
        "is_bottleneck",
    ];
}

// ============================================================================
// Operator Performance
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorPerformanceRecord {
    pub operator: String,
    pub total_phases: usize,
    pub avg_cycle_time: f64,
    pub avg_actual_duration: Option<f64>,
    pub total_quantity: i64,
    pub efficiency: Option<f64>,
}

impl Tabular for OperatorPerformanceRecord {
    const TABLE: &'static str = "operator_performance";
    const COLUMNS: &'static [&'static str] = &[
        "operator",
        "total_phases",
        "avg_cycle_time",
        "avg_actual_duration",
        "total_quantity",
        "efficiency",
    ];
}

// ============================================================================
// Summary
// ============================================================================

/// Cross-cutting KPI snapshot of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub total_orders: usize,
    pub completed_orders: usize,
    pub active_machines: usize,
    pub total_machines: usize,
    pub avg_order_lead_time: Option<f64>,
    /// Percentage of orders with a defined `on_time` that were on time.
    /// 0 (not null) when no order has one.
    pub on_time_delivery_rate: f64,
    pub avg_machine_utilization: Option<f64>,
    pub avg_machine_efficiency: Option<f64>,
    pub total_operators: usize,
    pub bottleneck_machines: Vec<String>,
}

/// All six outputs of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub phase_metrics: Vec<PhaseMetricRecord>,
    pub machine_metrics: Vec<MachineMetricRecord>,
    pub order_timeline: Vec<OrderTimelineRecord>,
    pub queue_analysis: Vec<QueueAnalysisRecord>,
    pub operator_performance: Vec<OperatorPerformanceRecord>,
    pub summary: SummaryStatistics,
}
