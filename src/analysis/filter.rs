//! Inclusive date-range filter.

use chrono::NaiveDate;

use crate::domain::Dataset;

/// Rows with `start <= date_of_transaction <= end`, in their original order.
///
/// `start > end` yields an empty dataset. Rows without a date never match.
pub fn filter_range(dataset: &Dataset, start: NaiveDate, end: NaiveDate) -> Dataset {
    if start > end {
        return Dataset::default();
    }
    let records = dataset
        .iter()
        .filter(|r| matches!(r.date_of_transaction, Some(d) if d >= start && d <= end))
        .cloned()
        .collect();
    Dataset::new(records)
}
