//! Canonical production input: orders, their phases, and machines.
//!
//! Produced by `acquisition` from wire documents; immutable for a run.

use serde::{Deserialize, Serialize};

use crate::acquisition::Timestamp;

/// A production order with its ordered process steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub order_status: i64,
    pub quantity: i64,
    pub article_code: String,
    pub product_family: String,
    pub priority: i64,
    pub insert_date: Option<Timestamp>,
    pub start_date: Option<Timestamp>,
    pub deadline: Option<Timestamp>,
    pub real_finish_date: Option<Timestamp>,
    pub phases: Vec<Phase>,
}

/// One process step of an order, tracked against the machine sharing its name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub phase_id: String,
    /// Also the join key to [`Machine::name`].
    pub phase_name: String,
    pub phase_status: i64,
    /// Planned time units per unit of quantity.
    pub cycle_time: i64,
    pub phase_real_time: i64,
    pub declared_quantity: i64,
    /// Operator identifiers as stored (untrimmed, may contain blanks).
    pub operators: Vec<String>,
    pub queue_insert_date: Option<Timestamp>,
    pub queue_real_insert_date: Option<Timestamp>,
    pub planned_finish_date: Option<Timestamp>,
    pub real_finish_date: Option<Timestamp>,
}

/// Machine descriptor, independent of any order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub name: String,
    pub is_active: bool,
    pub queue_target_time: i64,
    /// Size of the machine's attached worklist.
    pub current_queue_length: usize,
}

/// Everything one run reads: fetched once, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub orders: Vec<Order>,
    pub machines: Vec<Machine>,
}

impl Snapshot {
    pub fn new(orders: Vec<Order>, machines: Vec<Machine>) -> Self {
        Self { orders, machines }
    }

    /// Total number of embedded phases across all orders.
    pub fn phase_count(&self) -> usize {
        self.orders.iter().map(|o| o.phases.len()).sum()
    }
}
