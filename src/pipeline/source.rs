//! Document source abstraction for snapshot ingestion.
//!
//! A run reads all orders and all machines exactly once through
//! [`DocumentSource::fetch_snapshot`]. Implementations handle the storage
//! format; decoding of individual scalars happens in `acquisition`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::acquisition::{machine_document, order_document};
use crate::types::{Machine, Order, Snapshot};

/// Errors that make a snapshot unavailable. Fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),
    #[error("invalid JSON in {} (line {}): {}", .0.display(), .1, .2)]
    Json(PathBuf, usize, serde_json::Error),
    #[error("{0}")]
    Unavailable(String),
}

/// Trait abstracting where order and machine documents come from.
#[async_trait]
pub trait DocumentSource: Send + Sync + 'static {
    /// Fetch all orders and machines as one immutable snapshot.
    async fn fetch_snapshot(&self) -> Result<Snapshot, SourceError>;

    /// Human-readable name for logging (e.g. "json-files", "static").
    fn source_name(&self) -> &str;
}

// ============================================================================
// JSON File Source (document-store export)
// ============================================================================

/// Reads exported `NewOrder` and `macchinari` collections from disk.
///
/// Each file is either a JSON array of documents or one document per line.
pub struct JsonFileSource {
    orders_path: PathBuf,
    machines_path: PathBuf,
}

impl JsonFileSource {
    pub fn new(orders_path: impl Into<PathBuf>, machines_path: impl Into<PathBuf>) -> Self {
        Self {
            orders_path: orders_path.into(),
            machines_path: machines_path.into(),
        }
    }
}

#[async_trait]
impl DocumentSource for JsonFileSource {
    async fn fetch_snapshot(&self) -> Result<Snapshot, SourceError> {
        let order_values = read_documents(&self.orders_path).await?;
        let machine_values = read_documents(&self.machines_path).await?;

        let orders: Vec<Order> = order_values
            .into_iter()
            .enumerate()
            .filter_map(|(idx, value)| match order_document(value) {
                Some(doc) => Some(Order::from(&doc)),
                None => {
                    warn!(index = idx, path = %self.orders_path.display(), "Skipping non-object order document");
                    None
                }
            })
            .collect();

        let machines: Vec<Machine> = machine_values
            .into_iter()
            .enumerate()
            .filter_map(|(idx, value)| match machine_document(value) {
                Some(doc) => Some(Machine::from(&doc)),
                None => {
                    warn!(index = idx, path = %self.machines_path.display(), "Skipping non-object machine document");
                    None
                }
            })
            .collect();

        Ok(Snapshot::new(orders, machines))
    }

    fn source_name(&self) -> &str {
        "json-files"
    }
}

async fn read_documents(path: &Path) -> Result<Vec<Value>, SourceError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SourceError::Io(path.to_path_buf(), e))?;
    let documents = parse_documents(path, &content)?;
    debug!(path = %path.display(), documents = documents.len(), "Documents read");
    Ok(documents)
}

/// Parse either a JSON array or newline-delimited JSON documents.
pub fn parse_documents(path: &Path, content: &str) -> Result<Vec<Value>, SourceError> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        let value: Value =
            serde_json::from_str(trimmed).map_err(|e| SourceError::Json(path.to_path_buf(), e.line(), e))?;
        return Ok(match value {
            Value::Array(items) => items,
            other => vec![other],
        });
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| SourceError::Json(path.to_path_buf(), idx + 1, e))
        })
        .collect()
}

// ============================================================================
// Static Source (tests / embedding)
// ============================================================================

/// Serves a fixed in-memory snapshot.
pub struct StaticSource {
    snapshot: Snapshot,
}

impl StaticSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    async fn fetch_snapshot(&self) -> Result<Snapshot, SourceError> {
        Ok(self.snapshot.clone())
    }

    fn source_name(&self) -> &str {
        "static"
    }
}
