//! JSON envelope for analytics responses.
//!
//! Success bodies are `{ "data": ..., "meta": ... }`. Failures are raised as
//! [`ApiError`] by the handlers and rendered as `{ "error": ..., "meta": ... }`
//! with the HTTP status picked from the failing layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::pipeline::RunError;
use crate::storage::ExportError;

#[derive(Debug, Serialize)]
pub struct Meta {
    pub generated_at: DateTime<Local>,
    pub service_version: &'static str,
}

impl Meta {
    fn now() -> Self {
        Self {
            generated_at: Local::now(),
            service_version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[derive(Debug, Serialize)]
struct DataBody<T> {
    data: T,
    meta: Meta,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
    meta: Meta,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

/// `200 OK` with `data` wrapped in the envelope.
pub fn ok<T: Serialize>(data: T) -> Response {
    Json(DataBody { data, meta: Meta::now() }).into_response()
}

/// Failure of an analytics endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("stored summary is unreadable: {0}")]
    CorruptSummary(#[from] serde_json::Error),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Export(ExportError::InvalidFileName(_)) => (StatusCode::BAD_REQUEST, "INVALID_FILE_NAME"),
            Self::Run(RunError::Source(_)) => (StatusCode::INTERNAL_SERVER_ERROR, "SOURCE_UNAVAILABLE"),
            Self::Run(_) => (StatusCode::INTERNAL_SERVER_ERROR, "RUN_FAILED"),
            Self::Export(_) => (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_FAILED"),
            Self::CorruptSummary(_) | Self::Task(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message: self.to_string(),
            },
            meta: Meta::now(),
        };
        (status, Json(body)).into_response()
    }
}
