//! Headline metrics: row count and most frequent prices.

use crate::domain::{Dataset, SummarySnapshot};

/// Count rows and take the mode of each price column.
pub fn summarize(dataset: &Dataset) -> SummarySnapshot {
    SummarySnapshot {
        count: dataset.len(),
        mode_unit_price: mode(dataset.unit_prices()),
        mode_total_price: mode(dataset.total_prices()),
    }
}

/// Most frequent value; ties go to the smallest value.
///
/// Values are compared exactly (no rounding), except that `-0.0` and `0.0`
/// count as the same value. Non-finite inputs are ignored.
pub fn mode(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    // `+ 0.0` folds -0.0 into 0.0.
    let mut sorted: Vec<f64> = values
        .into_iter()
        .filter(|v| v.is_finite())
        .map(|v| v + 0.0)
        .collect();
    sorted.sort_by(f64::total_cmp);

    let mut best: Option<(f64, usize)> = None;
    for run in sorted.chunk_by(|a, b| a == b) {
        // Runs arrive in ascending order, so a strict `>` keeps the smallest on ties.
        if best.is_none_or(|(_, n)| run.len() > n) {
            best = Some((run[0], run.len()));
        }
    }
    best.map(|(v, _)| v)
}

/// Arithmetic mean, `None` when there are no values.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0_f64, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}
