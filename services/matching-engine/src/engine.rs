//! Engine coordinator
//!
//! Owns one book worker per observed instrument. Books are created
//! lazily on first sight of an instrument; each worker drains its own
//! inbox until told to stop, so shutdown never drops queued events.

use crate::book::OrderBook;
use crate::queue::HandoffQueue;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};
use types::order::Order;

const WORKER_IDLE_BACKOFF: Duration = Duration::from_millis(1);

/// Routes order events to per-instrument book workers
pub struct Engine {
    books: HashMap<String, BookWorker>,
    records: Arc<HandoffQueue<String>>,
    inbox_capacity: usize,
}

/// One matcher thread plus its inbox and stop flag
struct BookWorker {
    inbox: Arc<HandoffQueue<Order>>,
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Engine {
    /// `records` is the shared sink every book emits into;
    /// `inbox_capacity` bounds each per-instrument inbox.
    pub fn new(records: Arc<HandoffQueue<String>>, inbox_capacity: usize) -> Self {
        Self {
            books: HashMap::new(),
            records,
            inbox_capacity,
        }
    }

    /// Forward an order to its instrument's worker, spawning it first if
    /// this instrument has not been seen before. Blocks when the worker's
    /// inbox is full.
    pub fn submit(&mut self, order: Order) {
        if !self.books.contains_key(&order.instrument) {
            debug!(instrument = %order.instrument, "creating order book");
            let worker = self.spawn_worker(order.instrument.clone());
            self.books.insert(order.instrument.clone(), worker);
        }
        // Entry guaranteed by the insert above.
        if let Some(worker) = self.books.get(&order.instrument) {
            worker.inbox.push(order);
        }
    }

    /// Number of instruments seen so far
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    /// Signal every worker to finish its inbox, then join them all.
    /// Returns only once every queued event has been matched.
    pub fn shutdown(self) {
        for worker in self.books.values() {
            worker.stop.store(true, Ordering::Release);
        }
        for (instrument, worker) in self.books {
            if worker.handle.join().is_err() {
                warn!(instrument = %instrument, "book worker panicked");
            }
        }
    }

    fn spawn_worker(&self, instrument: String) -> BookWorker {
        let inbox = Arc::new(HandoffQueue::bounded(self.inbox_capacity));
        let stop = Arc::new(AtomicBool::new(false));
        let records = Arc::clone(&self.records);

        let worker_inbox = Arc::clone(&inbox);
        let worker_stop = Arc::clone(&stop);
        let thread_name = format!("book-{instrument}");
        let handle = thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                let mut book = OrderBook::new(instrument, records);
                while !worker_stop.load(Ordering::Acquire) || !worker_inbox.is_empty() {
                    match worker_inbox.try_pop() {
                        Some(order) => book.process(order),
                        None => thread::sleep(WORKER_IDLE_BACKOFF),
                    }
                }
            })
            .expect("failed to spawn book worker thread");

        BookWorker {
            inbox,
            stop,
            handle,
        }
    }
}
