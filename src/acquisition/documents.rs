//! Wire documents for the `NewOrder` and `macchinari` collections.
//!
//! Documents are read best-effort: every scalar is a [`RawScalar`] and every
//! nested list tolerates a wrong shape by degrading to empty. The only hard
//! failure is a top-level value that is not a JSON object.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::normalizer::{
    normalize_flag, normalize_int, normalize_text, normalize_timestamp, RawScalar,
};
use crate::types::{Machine, Order, Phase};

/// One `NewOrder` document as stored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderDocument {
    #[serde(rename = "orderId")]
    pub order_id: RawScalar,
    #[serde(rename = "orderStatus")]
    pub order_status: RawScalar,
    pub quantity: RawScalar,
    #[serde(rename = "codiceArticolo")]
    pub article_code: RawScalar,
    #[serde(rename = "famigliaDiProdotto")]
    pub product_family: RawScalar,
    pub priority: RawScalar,
    #[serde(rename = "orderInsertDate")]
    pub insert_date: RawScalar,
    #[serde(rename = "orderStartDate")]
    pub start_date: RawScalar,
    #[serde(rename = "orderDeadline")]
    pub deadline: RawScalar,
    #[serde(rename = "realOrderFinishDate")]
    pub real_finish_date: RawScalar,
    #[serde(rename = "Phases", deserialize_with = "lenient_phases")]
    pub phases: Vec<PhaseDocument>,
}

/// One entry of an order's `Phases` array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PhaseDocument {
    #[serde(rename = "phaseId")]
    pub phase_id: RawScalar,
    #[serde(rename = "phaseName")]
    pub phase_name: RawScalar,
    #[serde(rename = "phaseStatus")]
    pub phase_status: RawScalar,
    #[serde(rename = "cycleTime")]
    pub cycle_time: RawScalar,
    #[serde(rename = "phaseRealTime")]
    pub phase_real_time: RawScalar,
    #[serde(rename = "declaredQuantity")]
    pub declared_quantity: RawScalar,
    #[serde(deserialize_with = "lenient_strings")]
    pub operators: Vec<String>,
    #[serde(rename = "queueInsertDate")]
    pub queue_insert_date: RawScalar,
    #[serde(rename = "queueRealInsertDate")]
    pub queue_real_insert_date: RawScalar,
    #[serde(rename = "finishDate")]
    pub finish_date: RawScalar,
    #[serde(rename = "realFinishDate")]
    pub real_finish_date: RawScalar,
}

/// One `macchinari` document as stored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MachineDocument {
    pub name: RawScalar,
    #[serde(rename = "macchinarioActive")]
    pub active: RawScalar,
    #[serde(rename = "queueTargetTime")]
    pub queue_target_time: RawScalar,
    #[serde(deserialize_with = "lenient_len")]
    pub tablet: usize,
}

fn lenient_phases<'de, D>(deserializer: D) -> Result<Vec<PhaseDocument>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect())
}

fn lenient_len<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_array().map_or(0, Vec::len))
}

/// Parse a JSON value into an order document.
///
/// Returns `None` when the value is not an object.
pub fn order_document(value: Value) -> Option<OrderDocument> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// Parse a JSON value into a machine document.
///
/// Returns `None` when the value is not an object.
pub fn machine_document(value: Value) -> Option<MachineDocument> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

// ============================================================================
// Wire -> canonical
// ============================================================================

impl From<&PhaseDocument> for Phase {
    fn from(doc: &PhaseDocument) -> Self {
        Self {
            phase_id: normalize_text(&doc.phase_id),
            phase_name: normalize_text(&doc.phase_name),
            phase_status: normalize_int(&doc.phase_status),
            cycle_time: normalize_int(&doc.cycle_time),
            phase_real_time: normalize_int(&doc.phase_real_time),
            declared_quantity: normalize_int(&doc.declared_quantity),
            operators: doc.operators.clone(),
            queue_insert_date: normalize_timestamp(&doc.queue_insert_date),
            queue_real_insert_date: normalize_timestamp(&doc.queue_real_insert_date),
            planned_finish_date: normalize_timestamp(&doc.finish_date),
            real_finish_date: normalize_timestamp(&doc.real_finish_date),
        }
    }
}

impl From<&OrderDocument> for Order {
    fn from(doc: &OrderDocument) -> Self {
        Self {
            order_id: normalize_text(&doc.order_id),
            order_status: normalize_int(&doc.order_status),
            quantity: normalize_int(&doc.quantity),
            article_code: normalize_text(&doc.article_code),
            product_family: normalize_text(&doc.product_family),
            priority: normalize_int(&doc.priority),
            insert_date: normalize_timestamp(&doc.insert_date),
            start_date: normalize_timestamp(&doc.start_date),
            deadline: normalize_timestamp(&doc.deadline),
            real_finish_date: normalize_timestamp(&doc.real_finish_date),
            phases: doc.phases.iter().map(Phase::from).collect(),
        }
    }
}

impl From<&MachineDocument> for Machine {
    fn from(doc: &MachineDocument) -> Self {
        Self {
            name: normalize_text(&doc.name),
            is_active: normalize_flag(&doc.active),
            queue_target_time: normalize_int(&doc.queue_target_time),
            current_queue_length: doc.tablet,
        }
    }
}
