// ===============================
// src/unique.rs
// ===============================
//
// Rejection sampling untuk tabel ber-composite key:
//   draw key -> kalau sudah pernah, buang & draw ulang -> kalau baru, terima.
// Sebelum mulai, jumlah target dicek terhadap ukuran key space * max_fill.
// Lewat batas => GenError::KeySpace (fail fast, bukan loop tanpa akhir).
//
use ahash::AHashSet;
use std::hash::Hash;
use tracing::debug;

use crate::context::GenContext;
use crate::error::{GenError, Result};
use crate::metrics::KEY_REJECTIONS;

/// Size of a composite key space; saturates instead of overflowing.
pub fn key_space(dims: &[u64]) -> u64 {
    dims.iter().fold(1u64, |acc, d| acc.saturating_mul(*d))
}

/// Largest row count allowed for a key space at the given fill ratio.
pub fn allowed_rows(key_space: u64, max_fill: f64) -> usize {
    let cap = (key_space as f64 * max_fill).floor();
    if cap >= usize::MAX as f64 { usize::MAX } else { cap as usize }
}

/// Draw `target` rows whose keys are pairwise distinct.
///
/// `draw_key` samples a candidate key; `build` turns an accepted key into a
/// row, drawing the row's non-key fields from the same context.
pub fn sample_unique<K, R, D, B>(
    ctx: &mut GenContext,
    table: &'static str,
    target: usize,
    key_space: u64,
    max_fill: f64,
    mut draw_key: D,
    mut build: B,
) -> Result<Vec<R>>
where
    K: Eq + Hash + Copy,
    D: FnMut(&mut GenContext) -> K,
    B: FnMut(&mut GenContext, K) -> R,
{
    let allowed = allowed_rows(key_space, max_fill);
    if target > allowed {
        return Err(GenError::KeySpace { table, requested: target, allowed, key_space });
    }

    let mut seen: AHashSet<K> = AHashSet::with_capacity(target);
    let mut rows = Vec::with_capacity(target);
    let mut rejections: u64 = 0;

    while rows.len() < target {
        let key = draw_key(ctx);
        if !seen.insert(key) {
            rejections += 1;
            continue;
        }
        rows.push(build(ctx, key));
    }

    KEY_REJECTIONS.with_label_values(&[table]).inc_by(rejections);
    debug!(table, target, rejections, key_space, "unique sampling done");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_is_fraction_of_space() {
        assert_eq!(allowed_rows(1000, 0.5), 500);
        assert_eq!(allowed_rows(3, 0.5), 1);
        assert_eq!(allowed_rows(10, 1.0), 10);
    }

    #[test]
    fn key_space_saturates_on_huge_dimensions() {
        assert_eq!(key_space(&[150, 300, 1096]), 49_320_000);
        let huge = u64::from(u32::MAX);
        assert_eq!(key_space(&[huge, huge, 1096]), u64::MAX);
        assert!(allowed_rows(u64::MAX, 0.5) >= u32::MAX as usize);
    }

    #[test]
    fn keys_are_distinct_and_count_exact() {
        let mut ctx = GenContext::new(42);
        let rows = sample_unique(
            &mut ctx,
            "T",
            40,
            100,
            0.5,
            |c| c.id(100),
            |_, k| k,
        )
        .unwrap();
        assert_eq!(rows.len(), 40);
        let set: AHashSet<u32> = rows.iter().copied().collect();
        assert_eq!(set.len(), 40);
    }

    #[test]
    fn full_space_with_fill_one_terminates() {
        let mut ctx = GenContext::new(3);
        let mut rows = sample_unique(&mut ctx, "T", 8, 8, 1.0, |c| c.id(8), |_, k| k).unwrap();
        rows.sort_unstable();
        assert_eq!(rows, (1..=8).collect::<Vec<u32>>());
    }

    #[test]
    fn over_capacity_fails_fast() {
        let mut ctx = GenContext::new(42);
        let err = sample_unique(&mut ctx, "T", 51, 100, 0.5, |c| c.id(100), |_, k| k).unwrap_err();
        match err {
            GenError::KeySpace { table, requested, allowed, key_space } => {
                assert_eq!((table, requested, allowed, key_space), ("T", 51, 50, 100));
            }
            other => panic!("unexpected error: {other}"),
        }
        // Tidak ada draw sama sekali sebelum gagal
        assert_eq!(ctx.draws(), 0);
    }
}
