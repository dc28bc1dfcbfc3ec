//! Analytics Configuration - source paths, export targets, schedule and server
//!
//! Every field has a serde default so an empty (or missing) TOML file yields a
//! working configuration. Environment variables and CLI flags are layered on
//! top by [`AnalyticsConfig::apply_env_overrides`] and the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SHOPFLOOR_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "analytics_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one analytics deployment.
///
/// Load with `AnalyticsConfig::load()` which searches:
/// 1. `$SHOPFLOOR_CONFIG` env var
/// 2. `./analytics_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Where order / machine documents are read from
    #[serde(default)]
    pub source: SourceConfig,

    /// Where the derived tables are written
    #[serde(default)]
    pub export: ExportConfig,

    /// Periodic run interval
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl AnalyticsConfig {
    /// Load configuration using the standard search order.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded analytics config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded analytics config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    ///
    /// Not validated here: env and CLI overrides may still fix a field, so
    /// callers run [`Self::validate`] once everything is layered.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Apply `OUTPUT_DIR`, `SCHEDULE_INTERVAL_MINUTES` and `SHOPFLOOR_SERVER_ADDR`.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.export.output_dir = PathBuf::from(dir);
            }
        }
        if let Ok(raw) = std::env::var("SCHEDULE_INTERVAL_MINUTES") {
            match raw.trim().parse::<u64>() {
                Ok(minutes) => self.scheduler.interval_minutes = minutes,
                Err(_) => warn!(value = %raw, "Ignoring unparseable SCHEDULE_INTERVAL_MINUTES"),
            }
        }
        if let Ok(addr) = std::env::var("SHOPFLOOR_SERVER_ADDR") {
            if !addr.trim().is_empty() {
                self.server.addr = addr;
            }
        }
    }

    /// Check cross-field constraints, collecting every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.scheduler.interval_minutes == 0 {
            errors.push("scheduler.interval_minutes must be greater than 0".to_string());
        }
        if self.source.orders_path.as_os_str().is_empty() {
            errors.push("source.orders_path must not be empty".to_string());
        }
        if self.source.machines_path.as_os_str().is_empty() {
            errors.push("source.machines_path must not be empty".to_string());
        }
        if self.export.output_dir.as_os_str().is_empty() {
            errors.push("export.output_dir must not be empty".to_string());
        }
        if self.export.dashboard_dir.as_ref() == Some(&self.export.output_dir) {
            errors.push(format!(
                "export.dashboard_dir ({}) must differ from export.output_dir",
                self.export.output_dir.display()
            ));
        }
        if self.server.addr.trim().is_empty() {
            errors.push("server.addr must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Document snapshot location (MongoDB export of `NewOrder` / `macchinari`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_orders_path")]
    pub orders_path: PathBuf,
    #[serde(default = "default_machines_path")]
    pub machines_path: PathBuf,
}

fn default_orders_path() -> PathBuf {
    PathBuf::from("./data/NewOrder.json")
}

fn default_machines_path() -> PathBuf {
    PathBuf::from("./data/macchinari.json")
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            orders_path: default_orders_path(),
            machines_path: default_machines_path(),
        }
    }
}

/// Export targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory receiving the CSV tables and the summary JSON.
    ///
    /// Can be overridden by the `OUTPUT_DIR` env var or `--output-dir`.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Optional dashboard ingestion directory; artifacts are copied here
    /// after every successful export.
    #[serde(default)]
    pub dashboard_dir: Option<PathBuf>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_OUTPUT_DIR)
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            dashboard_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Minutes between runs. `SCHEDULE_INTERVAL_MINUTES` overrides.
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
}

const fn default_interval_minutes() -> u64 {
    defaults::DEFAULT_SCHEDULE_INTERVAL_MINUTES
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `SHOPFLOOR_SERVER_ADDR` env var or `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    defaults::DEFAULT_SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Tests
// ============================================================================
