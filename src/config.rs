// ===============================
// src/config.rs
// ===============================
/*
=============================================================================
Project : portfolio_seed_rust — deterministic portfolio fixture generator
Module  : config.rs
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
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use clap::Parser;
use dotenvy::dotenv;

use crate::error::{GenError, Result};

pub const DATE_FMT: &str = "%Y-%m-%d";
pub const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Flag level run (sisanya lewat ENV, lihat `Settings::from_lookup`)
#[derive(Clone, Debug, Parser)]
#[command(name = "portfolio_seed_rust", version, about = "Generate portfolio fixture CSV files")]
pub struct Args {
    /// RNG seed; same seed gives byte-identical files
    #[arg(long, env = "SEED", default_value_t = 42)]
    pub seed: u64,

    /// Directory the CSV files are written to
    #[arg(long, env = "OUTPUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Optional Prometheus text snapshot written after the run
    #[arg(long, env = "METRICS_FILE")]
    pub metrics_file: Option<PathBuf>,

    /// tracing filter, e.g. `info` or `portfolio_seed_rust=debug`
    #[arg(long = "log", env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableCounts {
    pub users: usize,
    pub securities: usize,
    pub portfolios: usize,
    pub trades: usize,
    pub positions: usize,
    pub prices: usize,
    pub dividends: usize,
    pub nav_rows: usize,
    pub return_rows: usize,
    pub imports: usize,
    pub import_rows: usize,
}

impl Default for TableCounts {
    fn default() -> Self {
        Self {
            users: 60,
            securities: 300,
            portfolios: 150,
            trades: 8000,
            positions: 2000,
            prices: 6000,
            dividends: 250,
            nav_rows: 2000,
            return_rows: 2000,
            imports: 80,
            import_rows: 9000,
        }
    }
}

/// Inclusive calendar-day window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(GenError::config("DATE_END", format!("{end} is before {start}")));
        }
        Ok(Self { start, end })
    }

    /// Number of distinct days, both ends included.
    pub fn days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }
}

/// Inclusive timestamp window with one-second resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateTimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateTimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if end < start {
            return Err(GenError::config("TS_END", format!("{end} is before {start}")));
        }
        Ok(Self { start, end })
    }

    pub fn seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub counts: TableCounts,
    pub dates: DateWindow,
    pub timestamps: DateTimeWindow,
    /// Peluang ImportRow punya normalized_security_id
    pub normalized_security_prob: f64,
    /// Max fraction of a composite key space a table may fill
    pub max_key_fill: f64,
    /// Pending, Processing, Failed, Completed
    pub import_status_weights: Vec<u32>,
    /// Pending, Processed, Failed
    pub import_row_status_weights: Vec<u32>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key/value source (ENV in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = TableCounts::default();
        let counts = TableCounts {
            users: parse_or(&lookup, "NUM_USERS", d.users)?,
            securities: parse_or(&lookup, "NUM_SECURITIES", d.securities)?,
            portfolios: parse_or(&lookup, "NUM_PORTFOLIOS", d.portfolios)?,
            trades: parse_or(&lookup, "NUM_TRADES", d.trades)?,
            positions: parse_or(&lookup, "NUM_POSITIONS", d.positions)?,
            prices: parse_or(&lookup, "NUM_PRICES", d.prices)?,
            dividends: parse_or(&lookup, "NUM_DIVIDENDS", d.dividends)?,
            nav_rows: parse_or(&lookup, "NUM_NAV_ROWS", d.nav_rows)?,
            return_rows: parse_or(&lookup, "NUM_RETURN_ROWS", d.return_rows)?,
            imports: parse_or(&lookup, "NUM_IMPORTS", d.imports)?,
            import_rows: parse_or(&lookup, "NUM_IMPORT_ROWS", d.import_rows)?,
        };

        let dates = DateWindow::new(
            parse_date(&lookup, "DATE_START", "2022-01-01")?,
            parse_date(&lookup, "DATE_END", "2024-12-31")?,
        )?;
        let timestamps = DateTimeWindow::new(
            parse_datetime(&lookup, "TS_START", "2020-01-01 00:00:00")?,
            parse_datetime(&lookup, "TS_END", "2024-12-31 00:00:00")?,
        )?;

        let normalized_security_prob = parse_or(&lookup, "NORMALIZED_SECURITY_PROB", 0.8)?;
        let max_key_fill = parse_or(&lookup, "MAX_KEY_FILL", 0.5)?;
        let import_status_weights = parse_weights(&lookup, "IMPORT_STATUS_WEIGHTS", 4)?;
        let import_row_status_weights = parse_weights(&lookup, "IMPORT_ROW_STATUS_WEIGHTS", 3)?;

        let settings = Settings {
            counts,
            dates,
            timestamps,
            normalized_security_prob,
            max_key_fill,
            import_status_weights,
            import_row_status_weights,
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.normalized_security_prob) {
            return Err(GenError::config(
                "NORMALIZED_SECURITY_PROB",
                format!("{} is not a probability", self.normalized_security_prob),
            ));
        }
        if !(self.max_key_fill > 0.0 && self.max_key_fill <= 1.0) {
            return Err(GenError::config(
                "MAX_KEY_FILL",
                format!("{} must be in (0, 1]", self.max_key_fill),
            ));
        }

        // Anak tanpa parent = FK tidak bisa diisi
        let c = &self.counts;
        let any = |xs: &[usize]| xs.iter().any(|n| *n > 0);
        let needs = [
            ("NUM_USERS", c.users, any(&[c.portfolios])),
            ("NUM_PORTFOLIOS", c.portfolios, any(&[c.trades, c.positions, c.nav_rows, c.return_rows, c.imports])),
            ("NUM_SECURITIES", c.securities, any(&[c.trades, c.positions, c.prices, c.dividends, c.import_rows])),
            ("NUM_IMPORTS", c.imports, any(&[c.import_rows])),
        ];
        for (key, parents, has_children) in needs {
            if parents == 0 && has_children {
                return Err(GenError::config(key, "must be > 0 while child tables have rows"));
            }
        }
        let all = [
            c.users, c.securities, c.portfolios, c.trades, c.positions, c.prices,
            c.dividends, c.nav_rows, c.return_rows, c.imports, c.import_rows,
        ];
        if all.iter().any(|n| u32::try_from(*n).is_err()) {
            return Err(GenError::config("NUM_*", "row counts must fit in u32"));
        }
        Ok(())
    }
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| GenError::config(key, format!("{raw:?}: {e}"))),
        None => Ok(default),
    }
}

// `KEY=` (kosong / spasi) diperlakukan sama dengan tidak di-set
fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|raw| !raw.trim().is_empty())
}

fn parse_date<F>(lookup: &F, key: &'static str, default: &str) -> Result<NaiveDate>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = non_empty(lookup, key).unwrap_or_else(|| default.to_string());
    NaiveDate::parse_from_str(raw.trim(), DATE_FMT)
        .map_err(|e| GenError::config(key, format!("{raw:?}: {e}")))
}

fn parse_datetime<F>(lookup: &F, key: &'static str, default: &str) -> Result<NaiveDateTime>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = non_empty(lookup, key).unwrap_or_else(|| default.to_string());
    NaiveDateTime::parse_from_str(raw.trim(), DATETIME_FMT)
        .map_err(|e| GenError::config(key, format!("{raw:?}: {e}")))
}

/// `1,1,2` style list; default is equal weights.
fn parse_weights<F>(lookup: &F, key: &'static str, arity: usize) -> Result<Vec<u32>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty(lookup, key) else {
        return Ok(vec![1; arity]);
    };
    let weights: Vec<u32> = raw
        .split(',')
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .map(|x| x.parse::<u32>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| GenError::config(key, format!("{raw:?}: {e}")))?;

    if weights.len() != arity {
        return Err(GenError::config(key, format!("expected {arity} weights, got {}", weights.len())));
    }
    if weights.iter().all(|w| *w == 0) {
        return Err(GenError::config(key, "at least one weight must be non-zero"));
    }
    Ok(weights)
}

/// Parse CLI flags; `.env` is loaded first so clap sees its values as ENV.
pub fn load_args() -> Args {
    let _ = dotenv();
    Args::parse()
}
