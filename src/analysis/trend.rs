//! Monthly trend series and the chart reference markers.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::analysis::summary::mean;
use crate::domain::{Dataset, MonthlyTrendPoint, ReferenceMarkers, SummarySnapshot};

/// Bucket rows by calendar month and average each price column.
///
/// Only months that contain at least one row are emitted, in ascending order.
pub fn aggregate_monthly(dataset: &Dataset) -> Vec<MonthlyTrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for record in dataset.iter() {
        let Some(month) = record.date_of_transaction.and_then(|d| d.with_day(1)) else {
            continue;
        };
        let (units, totals) = buckets.entry(month).or_default();
        units.extend(record.unit_price_per_ping);
        totals.extend(record.total_price);
    }

    buckets
        .into_iter()
        .map(|(month, (units, totals))| MonthlyTrendPoint {
            month,
            mean_unit_price: mean(units),
            mean_total_price: mean(totals),
        })
        .collect()
}

/// Where each chart draws its "most frequent" rule.
///
/// Per column: the mode from `summary`; without a mode, the mean of that column
/// over the whole `dataset` (not the monthly means); without any value, no rule.
pub fn reference_markers(dataset: &Dataset, summary: &SummarySnapshot) -> ReferenceMarkers {
    ReferenceMarkers {
        unit_price: summary
            .mode_unit_price
            .or_else(|| mean(dataset.unit_prices())),
        total_price: summary
            .mode_total_price
            .or_else(|| mean(dataset.total_prices())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::summarize;
    use crate::domain::TransactionRecord;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: NaiveDate, unit: Option<f64>, total: Option<f64>) -> TransactionRecord {
        TransactionRecord {
            community_name: "X".to_string(),
            date_of_transaction_roc: String::new(),
            date_of_transaction: Some(date),
            unit_price_per_ping: unit,
            total_price: total,
            transaction_target: String::new(),
        }
    }

    #[test]
    fn buckets_by_month_with_means() {
        let ds = Dataset::new(vec![
            record(ymd(2012, 2, 20), Some(200.0), Some(2000.0)),
            record(ymd(2012, 1, 15), Some(100.0), Some(1000.0)),
            record(ymd(2012, 2, 15), Some(100.0), Some(1000.0)),
        ]);
        let trend = aggregate_monthly(&ds);
        assert_eq!(
            trend,
            vec![
                MonthlyTrendPoint {
                    month: ymd(2012, 1, 1),
                    mean_unit_price: Some(100.0),
                    mean_total_price: Some(1000.0),
                },
                MonthlyTrendPoint {
                    month: ymd(2012, 2, 1),
                    mean_unit_price: Some(150.0),
                    mean_total_price: Some(1500.0),
                },
            ]
        );
    }

    #[test]
    fn no_gap_filling_and_unique_months() {
        let ds = Dataset::new(vec![
            record(ymd(2013, 6, 1), Some(1.0), Some(1.0)),
            record(ymd(2012, 1, 31), Some(1.0), Some(1.0)),
            record(ymd(2013, 6, 30), Some(3.0), Some(3.0)),
            record(ymd(2012, 1, 1), Some(1.0), Some(1.0)),
        ]);
        let months: Vec<_> = aggregate_monthly(&ds).into_iter().map(|p| p.month).collect();
        assert_eq!(months, vec![ymd(2012, 1, 1), ymd(2013, 6, 1)]);
    }

    #[test]
    fn bucket_without_prices_has_absent_means() {
        let ds = Dataset::new(vec![
            record(ymd(2012, 1, 5), None, Some(900.0)),
            record(ymd(2012, 1, 6), None, None),
        ]);
        let trend = aggregate_monthly(&ds);
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].mean_unit_price, None);
        assert_eq!(trend[0].mean_total_price, Some(900.0));
    }

    #[test]
    fn empty_dataset_has_no_points() {
        assert!(aggregate_monthly(&Dataset::default()).is_empty());
    }

    #[test]
    fn markers_use_mode_when_present() {
        let ds = Dataset::new(vec![
            record(ymd(2012, 1, 1), Some(100.0), Some(1000.0)),
            record(ymd(2012, 1, 2), Some(100.0), Some(1000.0)),
            record(ymd(2012, 1, 3), Some(400.0), Some(4000.0)),
        ]);
        let markers = reference_markers(&ds, &summarize(&ds));
        assert_eq!(markers.unit_price, Some(100.0));
        assert_eq!(markers.total_price, Some(1000.0));
    }

    #[test]
    fn markers_fall_back_to_overall_mean() {
        let ds = Dataset::new(vec![
            record(ymd(2012, 1, 1), Some(100.0), Some(1000.0)),
            record(ymd(2012, 2, 1), Some(200.0), None),
            record(ymd(2012, 2, 2), Some(600.0), None),
        ]);
        // No mode reported for unit price: fall back to the mean of all rows,
        // not the mean of monthly means.
        let summary = SummarySnapshot {
            count: 3,
            mode_unit_price: None,
            mode_total_price: None,
        };
        let markers = reference_markers(&ds, &summary);
        assert_eq!(markers.unit_price, Some(300.0));
        assert_eq!(markers.total_price, Some(1000.0));
    }

    #[test]
    fn no_marker_without_values() {
        let ds = Dataset::new(vec![record(ymd(2012, 1, 1), None, None)]);
        let markers = reference_markers(&ds, &summarize(&ds));
        assert_eq!(markers, ReferenceMarkers::default());
    }
}
