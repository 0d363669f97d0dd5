//! Input adapter
//!
//! Reads the CSV order stream, coerces each row into a typed `Order` and
//! pushes it into the input queue. Columns are resolved by header name, so
//! their order in the file does not matter. Malformed rows are logged and
//! skipped; they never reach the engine. Pushing into a bounded queue is
//! what applies backpressure to the file reader.

use crate::queue::HandoffQueue;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::io::Read;
use std::str::FromStr;
use tracing::{debug, error, info, warn};
use types::errors::ParseError;
use types::order::{Order, OrderAction, OrderStatus, OrderType, Side};

/// Counters reported once the input stream is exhausted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadSummary {
    /// Data rows seen (header excluded)
    pub rows: u64,
    /// Rows successfully coerced and enqueued
    pub parsed: u64,
    /// Rows dropped for parse errors
    pub skipped: u64,
}

/// Read every order from `input` into `queue`
///
/// Returns the counters on success; only transport-level failures (I/O,
/// encoding) surface as errors. The caller raises its done-reading flag
/// after this returns.
pub fn read_orders<R: Read>(
    input: R,
    queue: &HandoffQueue<Order>,
) -> csv::Result<ReadSummary> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    if headers.iter().all(|name| name.is_empty()) {
        let err = ParseError::EmptyHeader;
        error!(%err, "nothing to read");
        return Ok(ReadSummary::default());
    }
    let columns: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(index, name)| (name.to_string(), index))
        .collect();
    info!(columns = columns.len(), "parsed input header");

    let mut summary = ReadSummary::default();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        summary.rows += 1;
        let line = record.position().map(|p| p.line()).unwrap_or(summary.rows);

        if record.len() != headers.len() {
            let err = ParseError::FieldCount {
                expected: headers.len(),
                found: record.len(),
            };
            warn!(line, %err, "malformed row skipped");
            summary.skipped += 1;
            continue;
        }

        match parse_order(&record, &columns) {
            Ok(order) => {
                // Blocks while the queue is at capacity.
                queue.push(order);
                summary.parsed += 1;
            }
            Err(err) => {
                warn!(line, %err, "dropping unparseable row");
                summary.skipped += 1;
            }
        }
    }

    info!(
        rows = summary.rows,
        parsed = summary.parsed,
        skipped = summary.skipped,
        "finished reading orders"
    );
    Ok(summary)
}

fn field<'a>(
    record: &'a StringRecord,
    columns: &HashMap<String, usize>,
    name: &'static str,
) -> Result<&'a str, ParseError> {
    let index = *columns.get(name).ok_or(ParseError::MissingColumn { name })?;
    record.get(index).ok_or(ParseError::MissingField { name })
}

fn numeric<T: FromStr>(value: &str, field: &'static str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Coerce one CSV row into an order event
pub fn parse_order(
    record: &StringRecord,
    columns: &HashMap<String, usize>,
) -> Result<Order, ParseError> {
    let timestamp: u64 = numeric(field(record, columns, "timestamp")?, "timestamp")?;
    let order_id: i64 = numeric(field(record, columns, "order_id")?, "order_id")?;
    let instrument = field(record, columns, "instrument")?.to_string();
    let side: Side = field(record, columns, "side")?.parse()?;
    let order_type: OrderType = field(record, columns, "type")?.parse()?;
    let action: OrderAction = field(record, columns, "action")?.parse()?;

    let quantity: u64 = numeric(field(record, columns, "quantity")?, "quantity")?;
    if quantity == 0 && matches!(action, OrderAction::New | OrderAction::Modify) {
        warn!(order_id, %action, "zero quantity on an order event");
    }

    let price = match columns.get("price").and_then(|&index| record.get(index)) {
        None => {
            if order_type == OrderType::Limit && action == OrderAction::New {
                return Err(ParseError::MissingField { name: "price" });
            }
            0.0
        }
        Some(raw) => {
            if order_type == OrderType::Market {
                // Executed at whatever the book offers; a stated price is noise.
                if !raw.is_empty() && raw != "0" && raw != "0.0" {
                    debug!(order_id, value = raw, "price ignored for MARKET order");
                }
                0.0
            } else {
                let price: f64 = numeric(raw, "price")?;
                if price <= 0.0 && action == OrderAction::New {
                    warn!(order_id, price, "non-positive price on a NEW LIMIT order");
                }
                price
            }
        }
    };

    Ok(Order {
        timestamp,
        order_id,
        instrument,
        side,
        order_type,
        quantity,
        price,
        action,
        remaining_quantity: quantity,
        filled_quantity: 0,
        status: OrderStatus::Unknown,
    })
}
