//! Shared data structures for shop-floor KPI derivation
//!
//! - `production`: canonical inputs (Order, Phase, Machine, Snapshot)
//! - `kpi`: derived tables and the run summary

mod kpi;
mod production;

pub use kpi::*;
pub use production::*;
