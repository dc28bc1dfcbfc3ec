//! Document acquisition module
//!
//! Decodes raw order / machine documents into the canonical types the KPI
//! pipeline works on.

pub mod documents;
pub mod normalizer;

pub use documents::{machine_document, order_document, MachineDocument, OrderDocument, PhaseDocument};
pub use normalizer::{
    normalize_flag, normalize_int, normalize_text, normalize_timestamp, RawScalar, Timestamp,
};
