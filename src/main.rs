// ===============================
// src/main.rs
// ===============================
/*
 cd /home/kukuhtw/rust/portfolio_seed_rust

 # default: seed 42, tulis 11 CSV ke folder sekarang
 cargo run --release

 # folder lain + snapshot metrics
 cargo run --release -- --out-dir ./fixtures --metrics-file ./fixtures/run.prom

 # dataset kecil untuk demo
 NUM_TRADES=100 NUM_IMPORT_ROWS=50 cargo run -- --seed 7
*/
/*
=============================================================================
Project : portfolio_seed_rust — deterministic portfolio fixture generator
Module  : main.rs
Version : 0.5.0
Author  : Kukuh Tripamungkas Wicaksono (Kukuh TW)
Email   : kukuhtw@gmail.com
WhatsApp: https://wa.me/628129893706
LinkedIn: https://id.linkedin.com/in/kukuhtw
License : MIT (see LICENSE)

Summary : Seeds one RNG, fabricates users, securities, portfolios, trades,
          positions, daily prices, dividends, NAV, returns and import
          batches with valid foreign keys and unique composite keys, then
          writes one CSV per table.

(c) 2025 Kukuh TW. All rights reserved where applicable.
=============================================================================
*/
mod config;
mod context;
mod domain;
mod error;
mod generate;
mod metrics;
mod pipeline;
mod unique;
mod writer;

use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Args, Settings};

fn main() -> ExitCode {
    // ---- Config (CLI + .env) ----
    let args = config::load_args();

    // ---- Logging ----
    let filter = EnvFilter::try_new(&args.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "generation aborted");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> error::Result<()> {
    let settings = Settings::from_env()?;

    // ---- Metrics ----
    metrics::init();

    info!(
        seed = args.seed,
        out_dir = %args.out_dir.display(),
        counts = ?settings.counts,
        dates = %format!("{}..={}", settings.dates.start, settings.dates.end),
        normalized_security_prob = settings.normalized_security_prob,
        max_key_fill = settings.max_key_fill,
        "startup config"
    );

    let written = pipeline::run(args.seed, &args.out_dir, &settings)?;
    for w in &written {
        debug!(table = w.table, rows = w.rows, path = %w.path.display(), "file ok");
    }
    let total: usize = written.iter().map(|w| w.rows).sum();
    info!(files = written.len(), rows = total, "all tables written");

    if let Some(path) = &args.metrics_file {
        metrics::write_snapshot(path)?;
        info!(path = %path.display(), "metrics snapshot written");
    }
    Ok(())
}
