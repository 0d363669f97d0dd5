//! Bounded handoff queue
//!
//! Thread-safe FIFO connecting the pipeline stages. A bounded queue blocks
//! producers at capacity, which is what couples reader throughput to
//! matcher throughput; consumers either block on `pop` or poll with
//! `try_pop`. Strict FIFO across all concurrent producers and consumers;
//! items are never dropped or duplicated.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

/// Multi-producer multi-consumer FIFO with optional capacity
pub struct HandoffQueue<T> {
    inner: Mutex<VecDeque<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: Option<usize>,
}

impl<T> HandoffQueue<T> {
    /// Queue that blocks `push` while it holds `capacity` items
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn bounded(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");
        Self {
            inner: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity: Some(capacity),
        }
    }

    /// Queue whose `push` never blocks
    pub fn unbounded() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity: None,
        }
    }

    /// Enqueue, waiting for space when the queue is at capacity
    pub fn push(&self, item: T) {
        let mut queue = self.inner.lock();
        if let Some(capacity) = self.capacity {
            while queue.len() >= capacity {
                self.not_full.wait(&mut queue);
            }
        }
        queue.push_back(item);
        self.not_empty.notify_one();
    }

    /// Dequeue the head, waiting until an item is available
    pub fn pop(&self) -> T {
        let mut queue = self.inner.lock();
        loop {
            if let Some(item) = queue.pop_front() {
                self.not_full.notify_one();
                return item;
            }
            self.not_empty.wait(&mut queue);
        }
    }

    /// Dequeue the head without blocking
    pub fn try_pop(&self) -> Option<T> {
        let mut queue = self.inner.lock();
        let item = queue.pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Number of queued items; stale as soon as it is read
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Configured capacity, `None` for unbounded
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = HandoffQueue::unbounded();
        for i in 0..5 {
            queue.push(i);
        }
        for i in 0..5 {
            assert_eq!(queue.try_pop(), Some(i));
        }
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_len_and_empty() {
        let queue = HandoffQueue::bounded(4);
        assert!(queue.is_empty());
        queue.push(1);
        queue.push(2);
        assert_eq!(queue.len(), 2);
        queue.pop();
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_pop_blocks_until_push() {
        let queue = Arc::new(HandoffQueue::unbounded());
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                queue.push(99);
            })
        };

        // Blocks until the producer delivers.
        assert_eq!(queue.pop(), 99);
        producer.join().unwrap();
    }

    #[test]
    fn test_bounded_push_respects_capacity() {
        let queue = Arc::new(HandoffQueue::bounded(2));
        let queue2 = Arc::clone(&queue);

        let producer = thread::spawn(move || {
            for i in 0..100 {
                queue2.push(i);
            }
        });

        let mut received = Vec::new();
        while received.len() < 100 {
            if let Some(v) = queue.try_pop() {
                assert!(queue.len() <= 2);
                received.push(v);
            } else {
                thread::sleep(Duration::from_micros(50));
            }
        }
        producer.join().unwrap();

        assert_eq!(received, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_multiple_producers_drain_completely() {
        let queue = Arc::new(HandoffQueue::bounded(16));
        let handles: Vec<_> = (0..4)
            .map(|p| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..250 {
                        queue.push(p * 1000 + i);
                    }
                })
            })
            .collect();

        let mut count = 0;
        while count < 1000 {
            if queue.try_pop().is_some() {
                count += 1;
            } else {
                thread::sleep(Duration::from_micros(50));
            }
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(queue.is_empty());
    }
}
