//! System-wide default constants.
//!
//! Centralises the magic numbers of the KPI pipeline and the service shell.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Status Codes
// ============================================================================

/// Phase / order status code meaning "completed".
pub const STATUS_COMPLETED: i64 = 4;

/// Phase status codes counted as "in progress".
pub const STATUS_IN_PROGRESS: [i64; 3] = [1, 2, 3];

// ============================================================================
// Metrics
// ============================================================================

/// Assumed length of one working day in minutes (8 hours).
///
/// `utilization% = busy_minutes / (working_days * WORKDAY_MINUTES) * 100`
pub const WORKDAY_MINUTES: f64 = 8.0 * 60.0;

/// Decimal places kept in the queue-analysis and operator-performance tables.
pub const AGGREGATE_DECIMALS: i32 = 2;

/// Separator used when flattening a phase's operator list into one cell.
pub const OPERATOR_SEPARATOR: char = ',';

// ============================================================================
// Export
// ============================================================================

/// Default export directory for the six analytics artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "./analytics_output";

/// Name of the download-all archive written next to the artifacts.
pub const BUNDLE_FILE_NAME: &str = "analytics_all.zip";

/// Rollup file written next to the five tables.
pub const SUMMARY_FILE_NAME: &str = "summary_statistics.json";

// ============================================================================
// Scheduler / Server
// ============================================================================

/// Minutes between scheduled pipeline runs.
pub const DEFAULT_SCHEDULE_INTERVAL_MINUTES: u64 = 60;

/// HTTP bind address for the analytics API.
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:5000";
