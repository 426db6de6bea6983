//! Batch simulator CLI
//!
//! Usage:
//!   sf-sim --rounds 1000000 --seed 7
//!   sf-sim --config game.yaml --buy-feature --rounds 10000 --json

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use sf_sim::{BatchConfig, run_batch};
use sf_tumble::SlotConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Measure RTP and feature frequency over many rounds")]
struct Args {
    /// Entries to play (paid spins, or feature buys with --buy-feature)
    #[arg(short, long, default_value = "100000")]
    rounds: u64,

    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Buy the feature for every entry
    #[arg(long)]
    buy_feature: bool,

    /// Index into the bet table
    #[arg(long, default_value = "0")]
    bet_level: usize,

    /// JSON or YAML game config; the reference game when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SlotConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SlotConfig::default(),
    };

    let batch = BatchConfig {
        rounds: args.rounds,
        seed: args.seed,
        workers: args.workers.unwrap_or_else(num_cpus::get),
        buy_feature: args.buy_feature,
        bet_level: args.bet_level,
    };

    let started = Instant::now();
    let report = run_batch(&config, &batch).context("Simulation failed")?;
    let elapsed = started.elapsed();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} ({:.2}% target RTP)", config.name, config.math.rtp_target);
        println!("{report}");
        println!(
            "Elapsed:          {:.2}s ({:.0} rounds/s)",
            elapsed.as_secs_f64(),
            report.total_rounds as f64 / elapsed.as_secs_f64().max(1e-9)
        );
    }
    Ok(())
}
