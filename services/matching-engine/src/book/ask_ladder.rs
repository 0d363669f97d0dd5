//! Ask (sell-side) ladder
//!
//! Mirror of the bid ladder with the opposite price ordering: the lowest
//! ask is served first, which is BTreeMap's natural iteration order.

use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use types::order::Order;

use super::price_level::PriceLevel;

/// Sell side of a book, best (lowest) price first
#[derive(Debug, Clone, Default)]
pub struct AskLadder {
    levels: BTreeMap<OrderedFloat<f64>, PriceLevel>,
}

impl AskLadder {
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

    /// Best ask price (lowest)
    pub fn best_price(&self) -> Option<f64> {
        self.levels.keys().next().map(|p| p.into_inner())
    }

    /// Mutable access to the best level
    pub fn best_level_mut(&mut self) -> Option<(f64, &mut PriceLevel)> {
        self.levels
            .iter_mut()
            .next()
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
