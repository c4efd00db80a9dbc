// ===============================
// src/metrics.rs
// ===============================
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::fs;
use std::path::Path;
use std::sync::Once;

use crate::error::{GenError, Result};

// Single custom registry (we register everything here)
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub static ROWS_WRITTEN: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("rows_written_total", "rows written per table"),
        &["table"],
    )
    .unwrap()
});

pub static KEY_REJECTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "key_rejections_total",
            "duplicate composite keys discarded during sampling",
        ),
        &["table"],
    )
    .unwrap()
});

pub static FILES_WRITTEN: Lazy<IntCounter> =
    Lazy::new(|| IntCounter::new("files_written_total", "CSV files fully written").unwrap());

pub static RUN_SEED: Lazy<IntGauge> =
    Lazy::new(|| IntGauge::new("run_seed", "RNG seed of the last run").unwrap());

static INIT: Once = Once::new();

pub fn init() {
    // Register all metrics to the custom registry (sekali saja)
    INIT.call_once(|| {
        for m in [
            REGISTRY.register(Box::new(ROWS_WRITTEN.clone())),
            REGISTRY.register(Box::new(KEY_REJECTIONS.clone())),
            REGISTRY.register(Box::new(FILES_WRITTEN.clone())),
            REGISTRY.register(Box::new(RUN_SEED.clone())),
        ] {
            let _ = m;
        }
    });
}

// Encode all metrics in Prometheus text format
pub fn encode_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let families = REGISTRY.gather();
    let mut buf = Vec::new();
    encoder.encode(&families, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

// Gauge i64: seed di atas i64::MAX di-clamp, bukan wrap ke negatif
fn seed_gauge_value(seed: u64) -> i64 {
    i64::try_from(seed).unwrap_or(i64::MAX)
}

pub fn record_seed(seed: u64) {
    RUN_SEED.set(seed_gauge_value(seed));
}

/// Dump a text snapshot; the run is one-shot so there is nothing to scrape.
pub fn write_snapshot(path: &Path) -> Result<()> {
    let body = encode_metrics()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|source| GenError::Io { path: parent.to_path_buf(), source })?;
        }
    }
    fs::write(path, body).map_err(|source| GenError::Io { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_contains_registered_families() {
        init();
        init();
        ROWS_WRITTEN.with_label_values(&["Sample"]).inc_by(3);
        FILES_WRITTEN.inc();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.prom");
        write_snapshot(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("rows_written_total{table=\"Sample\"}"));
        assert!(text.contains("files_written_total"));
    }

    #[test]
    fn snapshot_creates_missing_directories() {
        init();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("nested").join("run.prom");
        write_snapshot(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("run_seed"));
    }

    #[test]
    fn large_seed_is_clamped_not_negative() {
        assert_eq!(seed_gauge_value(42), 42);
        assert_eq!(seed_gauge_value(i64::MAX as u64), i64::MAX);
        assert_eq!(seed_gauge_value(u64::MAX), i64::MAX);
        assert_eq!(seed_gauge_value(1 << 63), i64::MAX);
    }
}
