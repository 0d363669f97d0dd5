//! Output adapter
//!
//! Drains the shared record queue into the output sink, one CSV line per
//! record, after writing the fixed header.

use crate::queue::HandoffQueue;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use types::record::EventRecord;

const DRAIN_IDLE_BACKOFF: Duration = Duration::from_micros(10);

/// Write the header, then every record until the engine is done
///
/// `done` must be raised only after every book worker has been joined.
/// The flag is observed before the emptiness check, so records that were
/// queued while the engine drained its books are never dropped.
pub fn drain_records<W: Write>(
    mut out: W,
    queue: &HandoffQueue<String>,
    done: &AtomicBool,
) -> std::io::Result<u64> {
    writeln!(out, "{}", EventRecord::HEADER)?;

    let mut written = 0u64;
    loop {
        let finished = done.load(Ordering::Acquire);
        match queue.try_pop() {
            Some(line) => {
                writeln!(out, "{line}")?;
                written += 1;
            }
            None if finished && queue.is_empty() => break,
            None => thread::sleep(DRAIN_IDLE_BACKOFF),
        }
    }

    out.flush()?;
    Ok(written)
}
