//! Analytics artifact storage
//!
//! The run output lives on disk as five CSV tables and one summary JSON; see
//! [`Exporter`].

mod exporter;

pub use exporter::{ExportError, ExportedFile, Exporter};
