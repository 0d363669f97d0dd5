//! Price level with FIFO queue
//!
//! A price level holds every resting order at one price, in arrival order.
//! Matching consumes from the front, which is what enforces time priority
//! within the level.

use std::collections::VecDeque;
use types::order::Order;

/// Resting orders at a single price, FIFO-ordered
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    orders: VecDeque<Order>,
}

impl PriceLevel {
    pub fn new() -> Self {
        Self {
            orders: VecDeque::new(),
        }
    }

    /// Append at the back of the queue (loses to everything already here)
    pub fn insert(&mut self, order: Order) {
        self.orders.push_back(order);
    }

    /// Head of the queue, the next order to trade at this price
    pub fn front_mut(&mut self) -> Option<&mut Order> {
        self.orders.front_mut()
    }

    pub fn pop_front(&mut self) -> Option<Order> {
        self.orders.pop_front()
    }

    /// Remove an order by id, wherever it sits in the queue
    pub fn remove_by_id(&mut self, order_id: i64) -> Option<Order> {
        let position = self.orders.iter().position(|o| o.order_id == order_id)?;
        self.orders.remove(position)
    }

    /// Find an order by id without removing it
    pub fn find(&self, order_id: i64) -> Option<&Order> {
        self.orders.iter().find(|o| o.order_id == order_id)
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Total unexecuted quantity resting at this price
    pub fn resting_quantity(&self) -> u64 {
        self.orders.iter().map(|o| o.remaining_quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::order::{OrderAction, OrderStatus, OrderType, Side};

    fn order(id: i64, quantity: u64) -> Order {
        Order {
            timestamp: id as u64,
            order_id: id,
            instrument: "ABC".to_string(),
            side: Side::BUY,
            order_type: OrderType::Limit,
            quantity,
            price: 100.0,
            action: OrderAction::New,
            remaining_quantity: quantity,
            filled_quantity: 0,
            status: OrderStatus::Pending,
        }
    }

    #[test]
    fn test_fifo_order_preserved() {
        let mut level = PriceLevel::new();
        level.insert(order(1, 10));
        level.insert(order(2, 20));
        level.insert(order(3, 30));

        assert_eq!(level.front_mut().unwrap().order_id, 1);
        assert_eq!(level.pop_front().unwrap().order_id, 1);
        assert_eq!(level.front_mut().unwrap().order_id, 2);
    }

    #[test]
    fn test_remove_by_id_from_middle() {
        let mut level = PriceLevel::new();
        level.insert(order(1, 10));
        level.insert(order(2, 20));
        level.insert(order(3, 30));

        let removed = level.remove_by_id(2).unwrap();
        assert_eq!(removed.order_id, 2);
        assert_eq!(level.order_count(), 2);
        assert!(level.remove_by_id(2).is_none());

        // Remaining order of the queue is untouched.
        assert_eq!(level.pop_front().unwrap().order_id, 1);
        assert_eq!(level.pop_front().unwrap().order_id, 3);
    }

    #[test]
    fn test_resting_quantity_sums_remaining() {
        let mut level = PriceLevel::new();
        level.insert(order(1, 10));
        let mut partially = order(2, 20);
        partially.apply_fill(5);
        level.insert(partially);

        assert_eq!(level.resting_quantity(), 25);
    }

    #[test]
    fn test_find_does_not_remove() {
        let mut level = PriceLevel::new();
        level.insert(order(7, 10));
        assert!(level.find(7).is_some());
        assert_eq!(level.order_count(), 1);
        assert!(level.find(8).is_none());
    }
}
