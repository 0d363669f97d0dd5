//! Per-instrument order book
//!
//! One `OrderBook` owns both ladders for a single instrument and applies
//! order events against them. Books are single-owner: each lives inside
//! its worker thread, so nothing here takes a lock. Every state
//! transition is pushed to the shared record queue as a serialized line.

pub mod ask_ladder;
pub mod bid_ladder;
pub mod price_level;

pub use ask_ladder::AskLadder;
pub use bid_ladder::BidLadder;
pub use price_level::PriceLevel;

use crate::matching::{crossing, executor};
use crate::queue::HandoffQueue;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error};
use types::order::{Order, OrderAction, OrderStatus, OrderType, Side};
use types::record::EventRecord;

/// Levels per side included in the post-event debug snapshot
const SNAPSHOT_DEPTH: usize = 5;

/// Order book and matcher for one instrument
pub struct OrderBook {
    instrument: String,
    bids: BidLadder,
    asks: AskLadder,
    /// Ids that participated in a trade during the current event.
    /// Cleared at every event boundary; consulted by MODIFY to decide
    /// whether a re-rested order still owes a resting record.
    traded_this_event: HashSet<i64>,
    records: Arc<HandoffQueue<String>>,
}

impl OrderBook {
    pub fn new(instrument: impl Into<String>, records: Arc<HandoffQueue<String>>) -> Self {
        Self {
            instrument: instrument.into(),
            bids: BidLadder::new(),
            asks: AskLadder::new(),
            traded_this_event: HashSet::new(),
            records,
        }
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn best_bid_price(&self) -> Option<f64> {
        self.bids.best_price()
    }

    pub fn best_ask_price(&self) -> Option<f64> {
        self.asks.best_price()
    }

    /// Top-of-book view: (bids, asks), best level first
    pub fn depth(&self, levels: usize) -> (Vec<(f64, u64)>, Vec<(f64, u64)>) {
        (
            self.bids.depth_snapshot(levels),
            self.asks.depth_snapshot(levels),
        )
    }

    /// Apply one order event and emit every record it produces
    pub fn process(&mut self, order: Order) {
        let event_timestamp = order.timestamp;

        if order.instrument != self.instrument {
            error!(
                order_id = order.order_id,
                instrument = %order.instrument,
                book = %self.instrument,
                "order routed to the wrong book"
            );
            self.emit(EventRecord::transition(
                &order,
                OrderStatus::Rejected,
                event_timestamp,
            ));
            return;
        }

        self.traded_this_event.clear();

        match order.action {
            OrderAction::New => self.handle_new(order, event_timestamp),
            OrderAction::Modify => self.handle_modify(order, event_timestamp),
            OrderAction::Cancel => self.handle_cancel(order, event_timestamp),
        }

        let (bids, asks) = self.depth(SNAPSHOT_DEPTH);
        debug!(instrument = %self.instrument, ?bids, ?asks, "book after event");
    }

    fn emit(&self, record: EventRecord) {
        self.records.push(record.to_string());
    }

    fn handle_new(&mut self, mut order: Order, event_timestamp: u64) {
        order.remaining_quantity = order.quantity;
        order.filled_quantity = 0;
        order.status = OrderStatus::Pending;

        match order.order_type {
            OrderType::Limit => {
                let pending =
                    EventRecord::transition(&order, OrderStatus::Pending, event_timestamp);
                match order.side {
                    Side::BUY => self.bids.insert(order),
                    Side::SELL => self.asks.insert(order),
                }
                self.emit(pending);
                self.match_orders(event_timestamp);
            }
            OrderType::Market => {
                let initial_quantity = order.remaining_quantity;
                match order.side {
                    Side::BUY => self.sweep_asks(&mut order, event_timestamp),
                    Side::SELL => self.sweep_bids(&mut order, event_timestamp),
                }
                if !order.has_fills() && initial_quantity > 0 {
                    self.emit(EventRecord::transition(
                        &order,
                        OrderStatus::Rejected,
                        event_timestamp,
                    ));
                }
                // Any unfilled remainder is discarded: market orders never rest.
            }
        }
    }

    fn handle_modify(&mut self, request: Order, event_timestamp: u64) {
        let found = self
            .bids
            .remove_by_id(request.order_id)
            .or_else(|| self.asks.remove_by_id(request.order_id));

        let Some(mut modified) = found else {
            self.emit(EventRecord::transition(
                &request,
                OrderStatus::Rejected,
                event_timestamp,
            ));
            return;
        };

        // Full replace: new timestamp, price, quantity and type; side and
        // cumulative fills carry over. Time priority is always lost.
        modified.timestamp = event_timestamp;
        modified.price = request.price;
        modified.quantity = request.quantity;
        modified.order_type = request.order_type;
        modified.action = OrderAction::Modify;

        if modified.quantity <= modified.filled_quantity {
            // Nothing left to rest; the order ends here.
            modified.remaining_quantity = 0;
            modified.status = if modified.quantity == 0 && modified.filled_quantity == 0 {
                OrderStatus::Canceled
            } else {
                OrderStatus::Executed
            };
            self.emit(EventRecord::transition(
                &modified,
                modified.status,
                event_timestamp,
            ));
            return;
        }

        modified.remaining_quantity = modified.quantity - modified.filled_quantity;
        modified.status = OrderStatus::Pending;

        match modified.order_type {
            OrderType::Limit => {
                let order_id = modified.order_id;
                let side = modified.side;
                let price = modified.price;

                match side {
                    Side::BUY => self.bids.insert(modified),
                    Side::SELL => self.asks.insert(modified),
                }
                self.match_orders(event_timestamp);

                // Resting record only if the modified order neither traded
                // this event nor left the book.
                if !self.traded_this_event.contains(&order_id) {
                    let resting = match side {
                        Side::BUY => self.bids.find(price, order_id),
                        Side::SELL => self.asks.find(price, order_id),
                    };
                    if let Some(resting) = resting {
                        let record =
                            EventRecord::transition(resting, resting.status, event_timestamp);
                        self.emit(record);
                    }
                }
            }
            OrderType::Market => {
                let filled_before = modified.filled_quantity;
                let sweep_quantity = modified.remaining_quantity;
                match modified.side {
                    Side::BUY => self.sweep_asks(&mut modified, event_timestamp),
                    Side::SELL => self.sweep_bids(&mut modified, event_timestamp),
                }
                if modified.filled_quantity == filled_before && sweep_quantity > 0 {
                    self.emit(EventRecord::transition(
                        &modified,
                        OrderStatus::Rejected,
                        event_timestamp,
                    ));
                }
            }
        }
    }

    fn handle_cancel(&mut self, request: Order, event_timestamp: u64) {
        let found = self
            .bids
            .remove_by_id(request.order_id)
            .or_else(|| self.asks.remove_by_id(request.order_id));

        match found {
            Some(mut canceled) => {
                canceled.timestamp = event_timestamp;
                canceled.action = OrderAction::Cancel;
                canceled.status = OrderStatus::Canceled;
                self.emit(EventRecord::transition(
                    &canceled,
                    OrderStatus::Canceled,
                    event_timestamp,
                ));
            }
            None => {
                self.emit(EventRecord::transition(
                    &request,
                    OrderStatus::Rejected,
                    event_timestamp,
                ));
            }
        }
    }

    /// Match the tops of the ladders while they cross
    ///
    /// The buy-side record is emitted before the sell-side record for each
    /// fill. Fully filled heads are popped and emptied levels erased
    /// before the next iteration.
    fn match_orders(&mut self, event_timestamp: u64) {
        loop {
            let (Some(bid_price), Some(ask_price)) =
                (self.bids.best_price(), self.asks.best_price())
            else {
                break;
            };
            if !crossing::can_match(bid_price, ask_price) {
                break;
            }

            let (records, buy_filled, sell_filled) = {
                let Some((_, bid_level)) = self.bids.best_level_mut() else {
                    break;
                };
                let Some((_, ask_level)) = self.asks.best_level_mut() else {
                    break;
                };
                let Some(buy) = bid_level.front_mut() else {
                    break;
                };
                let Some(sell) = ask_level.front_mut() else {
                    break;
                };

                let price = crossing::execution_price(buy, sell, bid_price);
                let quantity = buy.remaining_quantity.min(sell.remaining_quantity);
                let records = executor::record_match(buy, sell, quantity, price, event_timestamp);
                (records, buy.is_filled(), sell.is_filled())
            };

            for record in records {
                self.traded_this_event.insert(record.order_id);
                self.emit(record);
            }
            if buy_filled {
                self.bids.pop_front(bid_price);
            }
            if sell_filled {
                self.asks.pop_front(ask_price);
            }
        }
    }

    /// Market buy: walk the asks from the best level outward
    ///
    /// Each fill prices at the resting order's price and emits the resting
    /// side's record first.
    fn sweep_asks(&mut self, order: &mut Order, event_timestamp: u64) {
        while order.remaining_quantity > 0 {
            let (records, resting_filled, ask_price) = {
                let Some((ask_price, level)) = self.asks.best_level_mut() else {
                    break;
                };
                let Some(resting) = level.front_mut() else {
                    break;
                };

                let price = resting.price;
                let quantity = order.remaining_quantity.min(resting.remaining_quantity);
                let records = executor::record_match(resting, order, quantity, price, event_timestamp);
                (records, resting.is_filled(), ask_price)
            };

            for record in records {
                self.traded_this_event.insert(record.order_id);
                self.emit(record);
            }
            if resting_filled {
                self.asks.pop_front(ask_price);
            }
        }
    }

    /// Market sell: walk the bids from the best level outward
    fn sweep_bids(&mut self, order: &mut Order, event_timestamp: u64) {
        while order.remaining_quantity > 0 {
            let (records, resting_filled, bid_price) = {
                let Some((bid_price, level)) = self.bids.best_level_mut() else {
                    break;
                };
                let Some(resting) = level.front_mut() else {
                    break;
                };

                let price = resting.price;
                let quantity = order.remaining_quantity.min(resting.remaining_quantity);
                let records = executor::record_match(resting, order, quantity, price, event_timestamp);
                (records, resting.is_filled(), bid_price)
            };

            for record in records {
                self.traded_this_event.insert(record.order_id);
                self.emit(record);
            }
            if resting_filled {
                self.bids.pop_front(bid_price);
            }
        }
    }
}
