//! Matching engine service
//!
//! Order matching with strict price-time priority across any number of
//! instruments, fed by a CSV order stream and draining a CSV record stream.
//!
//! **Pipeline:**
//! reader -> input queue -> router -> per-instrument book worker ->
//! output queue -> writer. Every hop is a bounded, thread-safe FIFO; each
//! book is owned by exactly one worker thread, so matching itself never
//! takes a lock.
//!
//! **Key invariants:**
//! - Price-time priority strictly enforced
//! - Quantity conservation per order
//! - Per-instrument record order consistent with the input
//! - Market orders never rest

pub mod book;
pub mod engine;
pub mod io;
pub mod logging;
pub mod matching;
pub mod queue;

pub use engine::Engine;
pub use queue::HandoffQueue;
