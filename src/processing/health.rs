use super::metrics::HealthScore;
use crate::table::frame::{column_names, row_keys};
use crate::utils::round2;
use polars::prelude::*;
use std::collections::HashSet;

const NULL_WEIGHT: f64 = 0.7;
const DUPLICATE_WEIGHT: f64 = 0.3;

/// Rows that repeat an earlier row exactly, missing cells comparing equal.
/// The first occurrence is not counted, so three identical rows count two.
pub fn duplicate_rows(df: &DataFrame) -> usize {
    let Ok(keys) = row_keys(df, &column_names(df)) else {
        return 0;
    };
    let mut seen = HashSet::with_capacity(keys.len());
    keys.iter().filter(|k| !seen.insert(k.as_str())).count()
}

/// Single 0-100 quality score from null density and exact-duplicate rows.
///
/// `score = 100 * (1 - (0.7 * null_fraction + 0.3 * duplicate_fraction))`,
/// clamped to `[0, 100]`. A table without rows or columns scores zero.
pub fn health_score(df: &DataFrame) -> HealthScore {
    let rows = df.height();
    let cols = df.width();
    if rows == 0 || cols == 0 {
        return HealthScore::default();
    }

    let nulls: usize = df.get_columns().iter().map(Column::null_count).sum();
    let null_fraction = nulls as f64 / (rows * cols) as f64;
    let dup_fraction = duplicate_rows(df) as f64 / rows as f64;

    let score = 100.0 * (1.0 - (NULL_WEIGHT * null_fraction + DUPLICATE_WEIGHT * dup_fraction));
    HealthScore {
        score: round2(score.clamp(0.0, 100.0)),
        null_pct: round2(null_fraction * 100.0),
        dup_pct: round2(dup_fraction * 100.0),
    }
}
