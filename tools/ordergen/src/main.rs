//! Synthetic order-flow generator
//!
//! Emits a CSV order stream shaped like real input: mostly NEW orders with
//! a mix of MODIFY and CANCEL against ids that are actually live, prices
//! rounded to a fixed tick, and an empty price field on MARKET rows.

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

const PRICE_TICK: f64 = 0.01;

/// Generate a synthetic order stream for the matching engine
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Number of data rows to generate
    #[arg(long, default_value_t = 10_000)]
    rows: u64,

    /// Number of distinct instruments
    #[arg(long, default_value_t = 200)]
    instruments: u32,

    /// RNG seed, for reproducible streams
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output path; stdout when omitted
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            generate(&cli, file)
        }
        None => generate(&cli, io::stdout().lock()),
    }
}

fn generate<W: Write>(cli: &Cli, out: W) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "timestamp",
        "order_id",
        "instrument",
        "side",
        "type",
        "quantity",
        "price",
        "action",
    ])?;

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let instruments: Vec<String> = (1..=cli.instruments)
        .map(|i| format!("INST{i:03}"))
        .collect();

    let mut timestamp: u64 = 1_700_000_000_000_000_000;
    let mut next_order_id: i64 = 1;
    let mut live_ids: Vec<i64> = Vec::new();

    for _ in 0..cli.rows {
        timestamp += rng.gen_range(100..10_000);

        // 70% NEW, 15% MODIFY, 15% CANCEL once ids exist to act on.
        let action = if live_ids.is_empty() {
            "NEW"
        } else {
            match rng.gen_range(0..100) {
                0..=69 => "NEW",
                70..=84 => "MODIFY",
                _ => "CANCEL",
            }
        };

        let order_id = match action {
            "NEW" => {
                let id = next_order_id;
                next_order_id += 1;
                live_ids.push(id);
                id
            }
            _ => {
                let index = rng.gen_range(0..live_ids.len());
                if action == "CANCEL" {
                    live_ids.swap_remove(index)
                } else {
                    live_ids[index]
                }
            }
        };

        let instrument = &instruments[rng.gen_range(0..instruments.len())];
        let side = if rng.gen_bool(0.5) { "BUY" } else { "SELL" };
        let order_type = if rng.gen_bool(0.9) { "LIMIT" } else { "MARKET" };
        let quantity = rng.gen_range(1..=200) * 5;

        let price = if order_type == "MARKET" {
            String::new()
        } else {
            let raw: f64 = rng.gen_range(50.0..500.0);
            let ticked = (raw / PRICE_TICK).round() * PRICE_TICK;
            format!("{ticked:.2}")
        };

        writer.write_record([
            timestamp.to_string(),
            order_id.to_string(),
            instrument.clone(),
            side.to_string(),
            order_type.to_string(),
            quantity.to_string(),
            price,
            action.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
