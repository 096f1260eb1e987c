//! Shared domain types.
//!
//! Missing values are explicit `Option`s at the field level. Consumers decide
//! what absence means; nothing relies on NaN propagating through arithmetic.

use chrono::NaiveDate;
use serde::Deserialize;

/// The single community every analysis is scoped to.
pub const TARGET_COMMUNITY: &str = "國家大第";

/// One cleaned row of the transaction dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub community_name: String,
    /// Raw local-era date as it appeared in the source file (e.g. `101/11/19`).
    pub date_of_transaction_roc: String,
    /// Resolved calendar date. Always `Some` for records held by a loaded `Dataset`.
    pub date_of_transaction: Option<NaiveDate>,
    /// 萬元/坪
    pub unit_price_per_ping: Option<f64>,
    /// 萬元
    pub total_price: Option<f64>,
    pub transaction_target: String,
}

/// A CSV row after column renaming, before any coercion.
///
/// Every field defaults to empty so short (flexible) records still deserialize;
/// the loader checks for the required header columns separately.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTransactionRow {
    #[serde(default)]
    pub community_name: String,
    #[serde(default)]
    pub date_of_transaction_roc: String,
    #[serde(default)]
    pub unit_price_per_ping: String,
    #[serde(default)]
    pub total_price: String,
    #[serde(default)]
    pub transaction_target: String,
}

/// An ordered table of transaction records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<TransactionRecord>,
}

impl Dataset {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.records.iter()
    }

    /// Earliest and latest transaction dates, used to seed the date-range control.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(|r| r.date_of_transaction);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Present values of the unit price column.
    pub fn unit_prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().filter_map(|r| r.unit_price_per_ping)
    }

    /// Present values of the total price column.
    pub fn total_prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().filter_map(|r| r.total_price)
    }
}

/// Monthly bucket of the trend series.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTrendPoint {
    /// First day of the bucket's month.
    pub month: NaiveDate,
    pub mean_unit_price: Option<f64>,
    pub mean_total_price: Option<f64>,
}

/// Headline metrics for the filtered range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummarySnapshot {
    pub count: usize,
    pub mode_unit_price: Option<f64>,
    pub mode_total_price: Option<f64>,
}

/// Y values for the horizontal "most frequent" rule drawn on each chart.
///
/// `None` means no rule is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReferenceMarkers {
    pub unit_price: Option<f64>,
    pub total_price: Option<f64>,
}
