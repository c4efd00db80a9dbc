// ===============================
// src/context.rs
// ===============================
//
// Generation context: satu-satunya sumber random untuk satu run.
// - Di-seed sekali (StdRng::seed_from_u64), tidak pernah di-reseed.
// - Dipassing eksplisit (&mut) ke setiap generator, tidak ada global RNG.
// - Urutan draw menentukan output: seed sama => file identik byte-per-byte.
//
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::distributions::{Alphanumeric, Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

use crate::config::{DateTimeWindow, DateWindow};
use crate::domain::Fixed;
use crate::error::{GenError, Result};

pub struct GenContext {
    rng: StdRng,
    draws: u64,
}

impl GenContext {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), draws: 0 }
    }

    /// Number of sampling calls made so far.
    pub fn draws(&self) -> u64 { self.draws }

    /// Uniform id in `1..=max` (a parent table's dense key range).
    pub fn id(&mut self, max: u32) -> u32 {
        self.draws += 1;
        self.rng.gen_range(1..=max)
    }

    pub fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        self.draws += 1;
        items[self.rng.gen_range(0..items.len())]
    }

    pub fn pick_weighted<T: Copy>(&mut self, dist: &Categorical<T>) -> T {
        self.draws += 1;
        dist.values[dist.index.sample(&mut self.rng)]
    }

    /// Uniform float in `[lo, hi]`, rounded to the column's precision.
    pub fn uniform<const DP: u32>(&mut self, lo: f64, hi: f64) -> Fixed<DP> {
        Fixed::new(self.raw_uniform(lo, hi))
    }

    /// Unrounded uniform float, for values derived before rounding.
    pub fn raw_uniform(&mut self, lo: f64, hi: f64) -> f64 {
        self.draws += 1;
        self.rng.gen_range(lo..=hi)
    }

    pub fn chance(&mut self, p: f64) -> bool {
        self.draws += 1;
        self.rng.gen_bool(p)
    }

    pub fn int(&mut self, range: RangeInclusive<i64>) -> i64 {
        self.draws += 1;
        self.rng.gen_range(range)
    }

    /// Day offset from `start`, both ends inclusive.
    pub fn date(&mut self, w: &DateWindow) -> NaiveDate {
        let span = (w.end - w.start).num_days();
        w.start + Duration::days(self.int(0..=span))
    }

    /// Second offset from `start`, both ends inclusive.
    pub fn datetime(&mut self, w: &DateTimeWindow) -> NaiveDateTime {
        w.start + Duration::seconds(self.int(0..=w.seconds()))
    }

    pub fn alphanumeric(&mut self, len: usize) -> String {
        self.draws += 1;
        (&mut self.rng)
            .sample_iter(Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }
}

/// Categorical distribution over a fixed set of values.
#[derive(Debug, Clone)]
pub struct Categorical<T> {
    values: Vec<T>,
    index: WeightedIndex<u32>,
}

impl<T: Copy> Categorical<T> {
    pub fn new(key: &'static str, values: &[T], weights: &[u32]) -> Result<Self> {
        if values.len() != weights.len() {
            return Err(GenError::config(
                key,
                format!("{} weights for {} values", weights.len(), values.len()),
            ));
        }
        let index = WeightedIndex::new(weights.iter().copied())
            .map_err(|e| GenError::config(key, e.to_string()))?;
        Ok(Self { values: values.to_vec(), index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn windows() -> (DateWindow, DateTimeWindow) {
        let d = DateWindow::new(
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 1, 3).unwrap(),
        )
        .unwrap();
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let t = DateTimeWindow::new(start, start + Duration::seconds(5)).unwrap();
        (d, t)
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = GenContext::new(42);
        let mut b = GenContext::new(42);
        for _ in 0..100 {
            assert_eq!(a.id(300), b.id(300));
            assert_eq!(a.alphanumeric(8), b.alphanumeric(8));
        }
        assert_eq!(a.draws(), 200);
    }

    #[test]
    fn different_seed_diverges() {
        let mut a = GenContext::new(42);
        let mut b = GenContext::new(43);
        let xs: Vec<u32> = (0..32).map(|_| a.id(1_000_000)).collect();
        let ys: Vec<u32> = (0..32).map(|_| b.id(1_000_000)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn dates_cover_inclusive_window() {
        let (d, t) = windows();
        let mut ctx = GenContext::new(7);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..500 {
            let day = ctx.date(&d);
            assert!(day >= d.start && day <= d.end);
            seen.insert(day);
            let ts = ctx.datetime(&t);
            assert!(ts >= t.start && ts <= t.end);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn zero_weight_value_never_drawn() {
        let dist = Categorical::new("TEST", &['a', 'b', 'c'], &[0, 0, 1]).unwrap();
        let mut ctx = GenContext::new(1);
        assert!((0..200).all(|_| ctx.pick_weighted(&dist) == 'c'));
    }

    #[test]
    fn mismatched_weights_rejected() {
        let err = Categorical::new("TEST", &[1, 2], &[1]).unwrap_err();
        assert!(matches!(err, GenError::Config { key: "TEST", .. }));
    }
}
