//! Shared "dashboard" logic used by both the report command and the TUI.
//!
//! Keeping this in one place avoids duplicating the workflow:
//! full dataset -> range filter -> {summary, monthly trend, markers}
//!
//! The front-ends then focus on presentation (printing vs widgets).

use chrono::NaiveDate;

use crate::analysis::{aggregate_monthly, filter_range, reference_markers, summarize};
use crate::domain::{Dataset, MonthlyTrendPoint, ReferenceMarkers, SummarySnapshot};

/// Shown when the load failed or the target community has no rows.
pub const MSG_LOAD_FAILED: &str =
    "數據載入失敗或目標社區無數據。請檢查 Supabase 憑證、檔案路徑或社區名稱。";
/// Shown when the selected range contains no rows.
pub const MSG_EMPTY_RANGE: &str = "在選定的日期範圍內沒有找到數據。請調整篩選條件。";

/// An inclusive calendar-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The widest range covering `dataset`, if it has any dated rows.
    pub fn covering(dataset: &Dataset) -> Option<Self> {
        dataset.date_bounds().map(|(start, end)| Self { start, end })
    }

    /// Clamp both ends into `bounds`.
    pub fn clamp_to(self, bounds: DateRange) -> Self {
        Self {
            start: self.start.clamp(bounds.start, bounds.end),
            end: self.end.clamp(bounds.start, bounds.end),
        }
    }
}

/// Everything a front-end renders for one date range.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub range: DateRange,
    pub filtered: Dataset,
    pub summary: SummarySnapshot,
    pub trend: Vec<MonthlyTrendPoint>,
    pub markers: ReferenceMarkers,
}

impl DashboardView {
    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }
}

/// Recompute the view for `range`. Statistics are skipped for an empty range.
pub fn build_view(full: &Dataset, range: DateRange) -> DashboardView {
    let filtered = filter_range(full, range.start, range.end);
    if filtered.is_empty() {
        return DashboardView {
            range,
            filtered,
            summary: SummarySnapshot::default(),
            trend: Vec::new(),
            markers: ReferenceMarkers::default(),
        };
    }

    let summary = summarize(&filtered);
    let trend = aggregate_monthly(&filtered);
    let markers = reference_markers(&filtered, &summary);
    DashboardView {
        range,
        filtered,
        summary,
        trend,
        markers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DatasetService, MemoryStore};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn example_service() -> DatasetService {
        let csv = "社區簡稱,交易日期,單價(萬元/坪),總價(萬元),交易標的\n\
                   X,101/01/15,100,1000,房地\n\
                   X,101/02/15,100,1000,房地\n\
                   X,101/02/20,200,2000,房地\n\
                   Y,101/01/01,999,9999,房地\n";
        let store = MemoryStore::new().with_object("realty-data", "f.csv", csv);
        DatasetService::new(Box::new(store), "realty-data", "f.csv", "X")
    }

    #[test]
    fn end_to_end_example() {
        let svc = example_service();
        let full = &svc.dataset().dataset;
        assert_eq!(full.len(), 3);

        let range = DateRange::covering(full).unwrap();
        assert_eq!(range, DateRange::new(ymd(2012, 1, 15), ymd(2012, 2, 20)));

        let view = build_view(full, range);
        assert_eq!(view.summary.count, 3);
        assert_eq!(view.summary.mode_unit_price, Some(100.0));
        assert_eq!(view.summary.mode_total_price, Some(1000.0));
        assert_eq!(view.trend.len(), 2);
        assert_eq!(view.trend[0].month, ymd(2012, 1, 1));
        assert_eq!(view.trend[0].mean_unit_price, Some(100.0));
        assert_eq!(view.trend[0].mean_total_price, Some(1000.0));
        assert_eq!(view.trend[1].month, ymd(2012, 2, 1));
        assert_eq!(view.trend[1].mean_unit_price, Some(150.0));
        assert_eq!(view.trend[1].mean_total_price, Some(1500.0));
        assert_eq!(view.markers.unit_price, Some(100.0));
    }

    #[test]
    fn empty_range_skips_statistics() {
        let svc = example_service();
        let view = build_view(
            &svc.dataset().dataset,
            DateRange::new(ymd(2013, 1, 1), ymd(2013, 12, 31)),
        );
        assert!(view.is_empty());
        assert!(view.trend.is_empty());
        assert_eq!(view.summary, SummarySnapshot::default());
    }

    #[test]
    fn clamp_keeps_range_inside_bounds() {
        let bounds = DateRange::new(ymd(2012, 1, 1), ymd(2012, 12, 31));
        let r = DateRange::new(ymd(2011, 6, 1), ymd(2013, 1, 1)).clamp_to(bounds);
        assert_eq!(r, bounds);
    }
}
