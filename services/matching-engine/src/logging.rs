//! Logging setup
//!
//! Builds the tracing subscriber from the CLI options: a level filter plus
//! a fmt layer writing either to stdout or, when a log file is configured,
//! through a non-blocking appender.

use anyhow::Context;
use std::fs::File;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Normalize the accepted level spellings into tracing directives
fn directive(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    match level.as_str() {
        "warning" => "warn".to_string(),
        "critical" => "error".to_string(),
        _ => level,
    }
}

/// Install the global subscriber
///
/// The returned guard must stay alive for the duration of the program;
/// dropping it flushes and detaches the file writer.
pub fn init(level: &str, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(directive(level))
        .with_context(|| format!("unrecognized log level '{level}'"))?;

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();
            Ok(None)
        }
    }
}
