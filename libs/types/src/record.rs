//! Output records
//!
//! Every state transition an order goes through (resting, fill, cancel,
//! reject) is described by one `EventRecord`, rendered as a CSV line.
//! The `quantity` and `price` columns are status-dependent:
//!
//! | status             | quantity           | price       |
//! |--------------------|--------------------|-------------|
//! | PENDING            | original quantity  | order price |
//! | PARTIALLY_EXECUTED | remaining quantity | order price |
//! | EXECUTED           | 0                  | order price |
//! | CANCELED           | 0                  | 0.0         |
//! | REJECTED           | original quantity  | order price |

use crate::order::{Order, OrderAction, OrderStatus, OrderType, Side};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the engine's output stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: u64,
    pub order_id: i64,
    pub instrument: String,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub quantity: u64,
    pub price: f64,
    pub action: OrderAction,
    pub status: OrderStatus,
    pub executed_quantity: u64,
    pub execution_price: f64,
    pub counterparty_id: i64,
}

impl EventRecord {
    /// Fixed header line of the output file
    pub const HEADER: &'static str = "timestamp,order_id,instrument,side,type,quantity,price,action,status,executed_quantity,execution_price,counterparty_id";

    /// Record for a non-trade transition (resting, cancel, reject,
    /// terminal modify). No executed quantity and no counterparty.
    pub fn transition(order: &Order, status: OrderStatus, event_timestamp: u64) -> Self {
        let quantity = match status {
            OrderStatus::Pending | OrderStatus::Rejected => order.quantity,
            OrderStatus::PartiallyExecuted => order.remaining_quantity,
            _ => 0,
        };
        let price = if status == OrderStatus::Canceled {
            0.0
        } else {
            order.price
        };

        Self {
            timestamp: event_timestamp,
            order_id: order.order_id,
            instrument: order.instrument.clone(),
            side: order.side,
            order_type: order.order_type,
            quantity,
            price,
            action: order.action,
            status,
            executed_quantity: 0,
            execution_price: 0.0,
            counterparty_id: 0,
        }
    }

    /// Record for one participant of a trade, taken after its fill has
    /// been applied.
    pub fn fill(
        order: &Order,
        matched_quantity: u64,
        match_price: f64,
        counterparty_id: i64,
        event_timestamp: u64,
    ) -> Self {
        let quantity = if order.status == OrderStatus::Executed {
            0
        } else {
            order.remaining_quantity
        };

        Self {
            timestamp: event_timestamp,
            order_id: order.order_id,
            instrument: order.instrument.clone(),
            side: order.side,
            order_type: order.order_type,
            quantity,
            price: order.price,
            action: order.action,
            status: order.status,
            executed_quantity: matched_quantity,
            execution_price: match_price,
            counterparty_id,
        }
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            self.timestamp,
            self.order_id,
            self.instrument,
            self.side,
            self.order_type,
            self.quantity,
            self.price,
            self.action,
            self.status,
            self.executed_quantity,
            self.execution_price,
            self.counterparty_id,
        )
    }
}
