//! API route definitions
//!
//! - /health - liveness
//! - /analytics/run - trigger a run (POST)
//! - /analytics/status - last run status
//! - /analytics/files, /analytics/download/:filename, /analytics/download-all
//! - /analytics/summary - latest summary statistics

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, ApiState};

/// Create all analytics routes
pub fn analytics_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/analytics/run", post(handlers::trigger_run))
        .route("/analytics/status", get(handlers::get_status))
        .route("/analytics/files", get(handlers::list_files))
        .route("/analytics/download/:filename", get(handlers::download_file))
        .route("/analytics/download-all", get(handlers::download_all))
        .route("/analytics/summary", get(handlers::get_summary))
        .with_state(state)
}
