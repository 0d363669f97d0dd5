//! Error types for order ingestion
//!
//! Parse error taxonomy using thiserror

use thiserror::Error;

/// Errors raised while coercing a CSV row into an order event.
///
/// Every variant maps to a dropped input row; none of them is fatal to the
/// engine itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("column '{name}' not present in header")]
    MissingColumn { name: &'static str },

    #[error("mandatory field '{name}' is missing")]
    MissingField { name: &'static str },

    #[error("field '{field}' with value '{value}' is not a valid number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid 'side' value '{0}', expected BUY or SELL")]
    InvalidSide(String),

    #[error("invalid 'type' value '{0}', expected LIMIT or MARKET")]
    InvalidOrderType(String),

    #[error("invalid 'action' value '{0}', expected NEW, MODIFY or CANCEL")]
    InvalidAction(String),

    #[error("field count {found} does not match header count {expected}")]
    FieldCount { expected: usize, found: usize },

    #[error("header line is empty or unreadable")]
    EmptyHeader,
}
