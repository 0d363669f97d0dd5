//! Crossing detection and price determination

use types::order::Order;

/// A bid and an ask can trade when the bid price reaches the ask price
pub fn can_match(bid_price: f64, ask_price: f64) -> bool {
    bid_price >= ask_price
}

/// Price at which the heads of the two best levels trade
///
/// The earlier-arrived side sets the price; equal timestamps trade at the
/// bid. After a modify an order carries the modify event's timestamp, so a
/// modified order prices like a fresh arrival.
pub fn execution_price(buy: &Order, sell: &Order, best_bid_price: f64) -> f64 {
    if buy.timestamp < sell.timestamp {
        buy.price
    } else if sell.timestamp < buy.timestamp {
        sell.price
    } else {
        best_bid_price
    }
}
