//! API route handlers
//!
//! Run trigger, run status and artifact download endpoints.

use std::io;
use std::path::Path;
use std::sync::Arc;

use axum::extract::{Path as UrlPath, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use serde_json::json;
use tracing::warn;

use super::envelope::{self, ApiError};
use crate::config::defaults::BUNDLE_FILE_NAME;
use crate::pipeline::AnalyticsRunner;
use crate::storage::ExportError;

type ApiResult = Result<Response, ApiError>;

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub runner: Arc<AnalyticsRunner>,
}

impl ApiState {
    pub fn new(runner: Arc<AnalyticsRunner>) -> Self {
        Self { runner }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
pub async fn get_health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "run_in_progress": state.runner.status().is_running(),
        "timestamp": Local::now().to_rfc3339(),
    }))
}

/// POST /analytics/run
pub async fn trigger_run(State(state): State<ApiState>) -> ApiResult {
    let summary = state.runner.run_once().await?;
    Ok(envelope::ok(json!({
        "message": "Analytics completed successfully",
        "output_directory": state.runner.exporter().output_dir().display().to_string(),
        "summary": summary,
    })))
}

/// GET /analytics/status
pub async fn get_status(State(state): State<ApiState>) -> Response {
    envelope::ok(state.runner.status().as_ref())
}

/// GET /analytics/files
pub async fn list_files(State(state): State<ApiState>) -> ApiResult {
    let files = state.runner.exporter().list_files()?;
    Ok(envelope::ok(json!({ "files": files })))
}

/// GET /analytics/download/:filename
pub async fn download_file(State(state): State<ApiState>, UrlPath(filename): UrlPath<String>) -> ApiResult {
    let path = state.runner.exporter().resolve(&filename)?;
    attachment(&path, &filename).await
}

/// GET /analytics/download-all
pub async fn download_all(State(state): State<ApiState>) -> ApiResult {
    let exporter = state.runner.exporter().clone();
    let path = tokio::task::spawn_blocking(move || exporter.bundle_zip()).await??;
    attachment(&path, BUNDLE_FILE_NAME).await
}

/// GET /analytics/summary
pub async fn get_summary(State(state): State<ApiState>) -> ApiResult {
    let path = state.runner.exporter().summary_path();
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound("Summary not found. Run analytics first.".to_string()));
        }
        Err(e) => return Err(ExportError::Io(path, e).into()),
    };

    let summary: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
        warn!(error = %e, "Stored summary is not valid JSON");
        ApiError::from(e)
    })?;
    Ok(envelope::ok(summary))
}

// ============================================================================
// Helpers
// ============================================================================

async fn attachment(path: &Path, filename: &str) -> ApiResult {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!("File not found: {filename}")));
        }
        Err(e) => return Err(ExportError::Io(path.to_path_buf(), e).into()),
    };

    let headers = [
        (header::CONTENT_TYPE, content_type(filename).to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
    ];
    Ok((headers, bytes).into_response())
}

fn content_type(filename: &str) -> &'static str {
    match Path::new(filename).extension().and_then(|e| e.to_str()) {
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type() {
        assert_eq!(content_type("phase_metrics.csv"), "text/csv");
        assert_eq!(content_type("summary_statistics.json"), "application/json");
        assert_eq!(content_type("analytics_all.zip"), "application/zip");
        assert_eq!(content_type("notes"), "application/octet-stream");
    }
}
