//! Formatted terminal output: metrics, monthly trend and the raw row table.
//!
//! We keep formatting code in one place so the TUI and the `report` command
//! show identical numbers.

use format_num::format_num;

use crate::app::pipeline::DashboardView;
use crate::domain::{Dataset, MonthlyTrendPoint, ReferenceMarkers, SummarySnapshot};

pub const NOT_AVAILABLE: &str = "N/A";

/// Row count with thousands separators.
pub fn format_count(count: usize) -> String {
    format_num!(",.0f", count as f64)
}

/// Mode unit price: two decimals, `萬元/坪`.
pub fn format_unit_price(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.2} 萬元/坪"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Mode total price: thousands separators, `萬元`.
pub fn format_total_price(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{} 萬元", format_thousands(v)),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Whole numbers print without decimals, anything else with two.
pub fn format_thousands(v: f64) -> String {
    if v.fract() == 0.0 {
        format_num!(",.0f", v)
    } else {
        format_num!(",.2f", v)
    }
}

/// The three headline metrics, one per line.
pub fn format_metrics(summary: &SummarySnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!("成交筆數: {}\n", format_count(summary.count)));
    out.push_str(&format!(
        "市場成交最多單價: {}\n",
        format_unit_price(summary.mode_unit_price)
    ));
    out.push_str(&format!(
        "市場成交最多總價: {}\n",
        format_total_price(summary.mode_total_price)
    ));
    out
}

/// Monthly means, with the reference markers underneath.
pub fn format_trend(trend: &[MonthlyTrendPoint], markers: &ReferenceMarkers) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<8} {:>14} {:>14}", "月份", "平均單價", "平均總價").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<8} {:-<14} {:-<14}", "", "", "").trim_end());
    out.push('\n');

    for p in trend {
        out.push_str(
            format!(
                "{:<8} {:>14} {:>14}",
                p.month.format("%Y-%m"),
                fmt_opt(p.mean_unit_price, 2),
                fmt_opt(p.mean_total_price, 0),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out.push_str(&format!(
        "最常見單價: {}  最常見總價: {}\n",
        fmt_opt(markers.unit_price, 2),
        fmt_opt(markers.total_price, 0)
    ));
    out
}

/// Every filtered row, in source order.
pub fn format_records(dataset: &Dataset) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<12} {:<10} {:<10} {:>10} {:>10} {:<16}",
            "社區", "交易日期", "日期", "單價(萬元/坪)", "總價(萬元)", "交易標的"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!("{:-<12} {:-<10} {:-<10} {:-<10} {:-<10} {:-<16}", "", "", "", "", "", "").trim_end(),
    );
    out.push('\n');

    for r in dataset.iter() {
        out.push_str(
            format!(
                "{:<12} {:<10} {:<10} {:>10} {:>10} {:<16}",
                truncate(&r.community_name, 12),
                truncate(&r.date_of_transaction_roc, 10),
                r.date_of_transaction
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                fmt_opt(r.unit_price_per_ping, 2),
                fmt_opt(r.total_price, 0),
                truncate(&r.transaction_target, 16),
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Full plain-text report for one view.
pub fn format_report(community: &str, view: &DashboardView) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== 斗六市{community} 實價登錄查詢 ===\n"));
    out.push_str(&format!("交易日期範圍: {} → {}\n", view.range.start, view.range.end));
    out.push_str(&format!("篩選結果：共 {} 筆交易\n\n", view.summary.count));
    out.push_str(&format_metrics(&view.summary));
    out.push_str("\n成交趨勢 (按月平均)\n");
    out.push_str(&format_trend(&view.trend, &view.markers));
    out.push_str("\n原始數據表格\n");
    out.push_str(&format_records(&view.filtered));
    out
}

pub fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(v) => format!("{v:.decimals$}"),
        None => "-".to_string(),
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn metric_formats() {
        assert_eq!(format_unit_price(Some(23.456)), "23.46 萬元/坪");
        assert_eq!(format_unit_price(None), "N/A");
        assert_eq!(format_total_price(Some(1280.0)), "1,280 萬元");
        assert_eq!(format_total_price(None), "N/A");
        assert_eq!(format_count(12345), "12,345");
    }

    #[test]
    fn trend_table_rows() {
        let trend = vec![MonthlyTrendPoint {
            month: NaiveDate::from_ymd_opt(2012, 2, 1).unwrap(),
            mean_unit_price: Some(150.0),
            mean_total_price: None,
        }];
        let out = format_trend(&trend, &ReferenceMarkers::default());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("2012-02"));
        assert!(lines[2].contains("150.00"));
        assert!(lines[2].ends_with('-'));
        assert!(lines[0].starts_with("月份"));
        assert_eq!(lines[3], "最常見單價: -  最常見總價: -");
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
