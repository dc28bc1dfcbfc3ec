//! Analytics Configuration Module
//!
//! Deployment settings loaded from TOML, with environment and CLI overrides
//! layered on top.
//!
//! ## Loading Order
//!
//! 1. `SHOPFLOOR_CONFIG` environment variable (path to TOML file)
//! 2. `analytics_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The KPI pipeline itself takes no configuration: its constants live in
//! [`defaults`] and every run is a pure function of the input snapshot.

mod analytics_config;
pub mod defaults;

pub use analytics_config::*;
