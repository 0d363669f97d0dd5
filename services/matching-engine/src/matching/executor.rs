//! Fill execution
//!
//! Applies one match to both participants and produces their output
//! records in a single step, so an observer never sees a half-applied
//! trade.

use types::order::Order;
use types::record::EventRecord;

/// Execute one match between two orders
///
/// Both orders have `quantity` filled and their statuses adjusted, then a
/// record is built for each participant referencing the other as
/// counterparty. Records come back in argument order: the limit match loop
/// passes (buy, sell); market sweeps pass (resting, market).
pub fn record_match(
    first: &mut Order,
    second: &mut Order,
    quantity: u64,
    price: f64,
    event_timestamp: u64,
) -> [EventRecord; 2] {
    first.apply_fill(quantity);
    second.apply_fill(quantity);

    [
        EventRecord::fill(first, quantity, price, second.order_id, event_timestamp),
        EventRecord::fill(second, quantity, price, first.order_id, event_timestamp),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::order::{OrderAction, OrderStatus, OrderType, Side};

    fn order(id: i64, side: Side, quantity: u64, price: f64) -> Order {
        Order {
            timestamp: id as u64,
            order_id: id,
            instrument: "ABC".to_string(),
            side,
            order_type: OrderType::Limit,
            quantity,
            price,
            action: OrderAction::New,
            remaining_quantity: quantity,
            filled_quantity: 0,
            status: OrderStatus::Pending,
        }
    }

    #[test]
    fn test_full_match_both_executed() {
        let mut buy = order(1, Side::BUY, 10, 100.0);
        let mut sell = order(2, Side::SELL, 10, 100.0);

        let [buy_rec, sell_rec] = record_match(&mut buy, &mut sell, 10, 100.0, 7);

        assert_eq!(buy.status, OrderStatus::Executed);
        assert_eq!(sell.status, OrderStatus::Executed);
        assert_eq!(buy_rec.order_id, 1);
        assert_eq!(buy_rec.counterparty_id, 2);
        assert_eq!(sell_rec.order_id, 2);
        assert_eq!(sell_rec.counterparty_id, 1);
        assert_eq!(buy_rec.quantity, 0);
        assert_eq!(buy_rec.executed_quantity, 10);
        assert_eq!(buy_rec.execution_price, 100.0);
        assert_eq!(buy_rec.timestamp, 7);
        assert_eq!(sell_rec.timestamp, 7);
    }

    #[test]
    fn test_partial_match_reports_remaining() {
        let mut buy = order(1, Side::BUY, 10, 100.0);
        let mut sell = order(2, Side::SELL, 4, 100.0);

        let [buy_rec, sell_rec] = record_match(&mut buy, &mut sell, 4, 100.0, 7);

        assert_eq!(buy.status, OrderStatus::PartiallyExecuted);
        assert_eq!(buy.remaining_quantity, 6);
        assert_eq!(buy.filled_quantity, 4);
        assert_eq!(buy_rec.quantity, 6);
        assert_eq!(sell_rec.quantity, 0);
        assert_eq!(sell_rec.status, OrderStatus::Executed);
    }

    #[test]
    fn test_records_share_trade_details() {
        let mut buy = order(1, Side::BUY, 8, 101.0);
        let mut sell = order(2, Side::SELL, 5, 100.5);

        let [buy_rec, sell_rec] = record_match(&mut buy, &mut sell, 5, 100.5, 3);

        assert_eq!(buy_rec.executed_quantity, sell_rec.executed_quantity);
        assert_eq!(buy_rec.execution_price, sell_rec.execution_price);
        assert_eq!(buy_rec.timestamp, sell_rec.timestamp);
    }
}
