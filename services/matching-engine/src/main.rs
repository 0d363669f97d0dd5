use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use matching_engine::io::{drain_records, read_orders};
use matching_engine::{logging, Engine, HandoffQueue};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Multi-instrument limit order book matching engine
///
/// Reads a CSV stream of order events, matches them with price-time
/// priority and writes one CSV record per state transition.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Log verbosity: trace, debug, info, warn, error, critical or off
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log file path; logs go to stdout when omitted
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Capacity of the queue between the reader and the router
    #[arg(long, default_value_t = 100_000)]
    queue_capacity: usize,

    /// Path to the order input file
    input: PathBuf,

    /// Path for the order result output file
    output: PathBuf,
}

const ROUTER_IDLE_BACKOFF: Duration = Duration::from_millis(1);

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let requested = matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            );
            let _ = err.print();
            return if requested {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let _guard = logging::init(&cli.log_level, cli.log_file.as_deref())?;

    info!(
        log_level = %cli.log_level,
        input = %cli.input.display(),
        output = %cli.output.display(),
        queue_capacity = cli.queue_capacity,
        "configuration loaded"
    );

    let input_file = File::open(&cli.input)
        .with_context(|| format!("failed to open input order file {}", cli.input.display()))?;
    let output_file = File::create(&cli.output)
        .with_context(|| format!("failed to open output result file {}", cli.output.display()))?;

    let input_queue = Arc::new(HandoffQueue::bounded(cli.queue_capacity));
    let record_queue = Arc::new(HandoffQueue::unbounded());
    let done_reading = Arc::new(AtomicBool::new(false));
    let books_stopped = Arc::new(AtomicBool::new(false));

    // Reader: file -> input queue, backpressured by the queue bound.
    let reader = {
        let input_queue = Arc::clone(&input_queue);
        let done_reading = Arc::clone(&done_reading);
        thread::Builder::new()
            .name("reader".to_string())
            .spawn(move || {
                let started = Instant::now();
                let result = read_orders(BufReader::new(input_file), &input_queue);
                done_reading.store(true, Ordering::Release);
                info!(elapsed = ?started.elapsed(), "input stream consumed");
                result
            })?
    };

    // Router: input queue -> per-instrument inboxes, then engine shutdown.
    let router = {
        let input_queue = Arc::clone(&input_queue);
        let done_reading = Arc::clone(&done_reading);
        let record_queue = Arc::clone(&record_queue);
        let books_stopped = Arc::clone(&books_stopped);
        let inbox_capacity = cli.queue_capacity;
        thread::Builder::new()
            .name("router".to_string())
            .spawn(move || {
                let started = Instant::now();
                let mut engine = Engine::new(record_queue, inbox_capacity);
                while !done_reading.load(Ordering::Acquire) || !input_queue.is_empty() {
                    match input_queue.try_pop() {
                        Some(order) => {
                            debug!(
                                order_id = order.order_id,
                                instrument = %order.instrument,
                                action = %order.action,
                                "routing order event"
                            );
                            engine.submit(order);
                        }
                        None => thread::sleep(ROUTER_IDLE_BACKOFF),
                    }
                }
                let instruments = engine.book_count();
                engine.shutdown();
                // Raised only after every worker has been joined; the
                // writer relies on this ordering.
                books_stopped.store(true, Ordering::Release);
                info!(instruments, elapsed = ?started.elapsed(), "matching complete");
            })?
    };

    // Writer runs on the main thread until the engine signals completion.
    let started = Instant::now();
    let written = drain_records(BufWriter::new(output_file), &record_queue, &books_stopped)
        .with_context(|| format!("failed writing records to {}", cli.output.display()))?;
    info!(records = written, elapsed = ?started.elapsed(), "output stream written");

    let summary = reader
        .join()
        .map_err(|_| anyhow::anyhow!("reader thread panicked"))?
        .context("reading input orders failed")?;
    router
        .join()
        .map_err(|_| anyhow::anyhow!("router thread panicked"))?;

    info!(
        parsed = summary.parsed,
        skipped = summary.skipped,
        records = written,
        "matching engine run completed"
    );
    Ok(())
}
