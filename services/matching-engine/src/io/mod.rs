//! External adapters: CSV order ingestion and record draining

pub mod reader;
pub mod writer;

pub use reader::{read_orders, ReadSummary};
pub use writer::drain_records;
