//! Bid (buy-side) ladder
//!
//! Price levels sorted so the highest bid is served first. BTreeMap keys
//! are `OrderedFloat` because prices arrive as IEEE-754 doubles.

use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use types::order::Order;

use super::price_level::PriceLevel;

/// Buy side of a book, best (highest) price first
#[derive(Debug, Clone, Default)]
pub struct BidLadder {
    levels: BTreeMap<OrderedFloat<f64>, PriceLevel>,
}

impl BidLadder {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Append the order at the tail of its price level
    pub fn insert(&mut self, order: Order) {
        self.levels
            .entry(OrderedFloat(order.price))
            .or_default()
            .insert(order);
    }

    /// Best bid price (highest)
    pub fn best_price(&self) -> Option<f64> {
        self.levels.keys().next_back().map(|p| p.into_inner())
    }

    /// Mutable access to the best level
    ///
    /// BTreeMap iterates ascending, so the best bid is the back entry.
    pub fn best_level_mut(&mut self) -> Option<(f64, &mut PriceLevel)> {
        self.levels
            .iter_mut()
            .next_back()
            .map(|(price, level)| (price.into_inner(), level))
    }

    /// Pop the head order at `price`, erasing the level once empty
    pub fn pop_front(&mut self, price: f64) -> Option<Order> {
        let key = OrderedFloat(price);
        let level = self.levels.get_mut(&key)?;
        let order = level.pop_front();
        if level.is_empty() {
            self.levels.remove(&key);
        }
        order
    }

    /// Remove an order by id, scanning every level
    ///
    /// Returns the removed order with its resting state intact.
    pub fn remove_by_id(&mut self, order_id: i64) -> Option<Order> {
        let key = self
            .levels
            .iter()
            .find(|(_, level)| level.find(order_id).is_some())
            .map(|(price, _)| *price)?;

        let level = self.levels.get_mut(&key)?;
        let order = level.remove_by_id(order_id);
        if level.is_empty() {
            self.levels.remove(&key);
        }
        order
    }

    /// Find a resting order by price and id
    pub fn find(&self, price: f64, order_id: i64) -> Option<&Order> {
        self.levels
            .get(&OrderedFloat(price))
            .and_then(|level| level.find(order_id))
    }

    /// Top `depth` levels as (price, resting quantity), best first
    pub fn depth_snapshot(&self, depth: usize) -> Vec<(f64, u64)> {
        self.levels
            .iter()
            .rev()
            .take(depth)
            .map(|(price, level)| (price.into_inner(), level.resting_quantity()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}
