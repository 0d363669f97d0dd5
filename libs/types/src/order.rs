//! Order lifecycle types
//!
//! An order is parsed once from the input stream and then carries its own
//! matching state (remaining quantity, cumulative fills, status) while it
//! rests in a book.

use crate::errors::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }
}

impl FromStr for Side {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("BUY") {
            Ok(Side::BUY)
        } else if s.eq_ignore_ascii_case("SELL") {
            Ok(Side::SELL)
        } else {
            Err(ParseError::InvalidSide(s.to_string()))
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::BUY => write!(f, "BUY"),
            Side::SELL => write!(f, "SELL"),
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Rests at its price when not immediately marketable
    Limit,
    /// Sweeps the opposing side, never rests
    Market,
}

impl FromStr for OrderType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("LIMIT") {
            Ok(OrderType::Limit)
        } else if s.eq_ignore_ascii_case("MARKET") {
            Ok(OrderType::Market)
        } else {
            Err(ParseError::InvalidOrderType(s.to_string()))
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Market => write!(f, "MARKET"),
        }
    }
}

/// Requested action for an order event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderAction {
    New,
    Modify,
    Cancel,
}

impl FromStr for OrderAction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("NEW") {
            Ok(OrderAction::New)
        } else if s.eq_ignore_ascii_case("MODIFY") {
            Ok(OrderAction::Modify)
        } else if s.eq_ignore_ascii_case("CANCEL") {
            Ok(OrderAction::Cancel)
        } else {
            Err(ParseError::InvalidAction(s.to_string()))
        }
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderAction::New => write!(f, "NEW"),
            OrderAction::Modify => write!(f, "MODIFY"),
            OrderAction::Cancel => write!(f, "CANCEL"),
        }
    }
}

/// Order status as tracked by the matching engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Resting in a ladder, no fills this lifetime yet
    Pending,
    /// Some quantity executed, remainder still live
    PartiallyExecuted,
    /// Completely executed (terminal)
    Executed,
    /// Canceled by request or by a zero-quantity modify (terminal)
    Canceled,
    /// Refused by the engine (terminal)
    Rejected,
    /// Parsed but not yet processed
    Unknown,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::PartiallyExecuted => "PARTIALLY_EXECUTED",
            OrderStatus::Executed => "EXECUTED",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::Unknown => "UNKNOWN",
        };
        write!(f, "{name}")
    }
}

/// One order event plus its matching state
///
/// `quantity` is the total quantity as stated on the current event;
/// `remaining_quantity` and `filled_quantity` evolve while the order rests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub timestamp: u64,
    pub order_id: i64,
    pub instrument: String,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub quantity: u64,
    pub price: f64,
    pub action: OrderAction,
    pub remaining_quantity: u64,
    pub filled_quantity: u64,
    pub status: OrderStatus,
}

impl Order {
    /// Quantity invariant: remaining + filled = total
    pub fn check_invariant(&self) -> bool {
        self.remaining_quantity + self.filled_quantity == self.quantity
    }

    /// Check if the order is completely executed
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// Check if the order has any fills
    pub fn has_fills(&self) -> bool {
        self.filled_quantity > 0
    }

    /// Apply a fill and adjust the status
    ///
    /// # Panics
    /// Panics if the fill exceeds the remaining quantity.
    pub fn apply_fill(&mut self, fill_quantity: u64) {
        assert!(
            fill_quantity <= self.remaining_quantity,
            "fill would exceed remaining quantity"
        );

        self.remaining_quantity -= fill_quantity;
        self.filled_quantity += fill_quantity;
        self.status = if self.remaining_quantity == 0 {
            OrderStatus::Executed
        } else {
            OrderStatus::PartiallyExecuted
        };
    }
}
