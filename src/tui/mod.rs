//! Ratatui-based terminal dashboard.
//!
//! Layout: header with the date-range selector, three metric boxes, the two
//! monthly trend charts, and a scrollable table of the filtered rows.

use std::io;
use std::time::Duration;

use chrono::{Datelike, Days, Months, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
};
use tracing::{debug, info};

use crate::app::pipeline::{DashboardView, DateRange, MSG_EMPTY_RANGE, MSG_LOAD_FAILED, build_view};
use crate::cli::RangeArgs;
use crate::data::DatasetService;
use crate::domain::MonthlyTrendPoint;
use crate::error::AppError;
use crate::report::{format_count, format_total_price, format_unit_price, truncate};

mod plotters_chart;

use plotters_chart::TrendChart;

/// Start the TUI.
pub fn run(service: DatasetService, initial: &RangeArgs) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(service);
    // Paint once so the user sees something during the download.
    terminal
        .draw(|f| app.draw(f))
        .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
    app.load(initial);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Which end of the date range the arrow keys move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeField {
    Start,
    End,
}

impl RangeField {
    fn toggle(self) -> Self {
        match self {
            RangeField::Start => RangeField::End,
            RangeField::End => RangeField::Start,
        }
    }

    fn label(self) -> &'static str {
        match self {
            RangeField::Start => "start",
            RangeField::End => "end",
        }
    }
}

struct App {
    service: DatasetService,
    /// Min/max transaction date of the full dataset; `None` until loaded or when empty.
    bounds: Option<DateRange>,
    range: Option<DateRange>,
    field: RangeField,
    date_input: Option<String>,
    view: Option<DashboardView>,
    table: TableState,
    status: String,
}

impl App {
    fn new(service: DatasetService) -> Self {
        Self {
            service,
            bounds: None,
            range: None,
            field: RangeField::Start,
            date_input: None,
            view: None,
            table: TableState::default(),
            status: "Fetching dataset...".to_string(),
        }
    }

    fn load(&mut self, initial: &RangeArgs) {
        let loaded = self.service.dataset();
        self.bounds = DateRange::covering(&loaded.dataset);
        self.status = match (&loaded.error, self.bounds) {
            (Some(err), _) => format!("Load error: {err}"),
            (None, None) => "No rows for the target community.".to_string(),
            (None, Some(_)) => format!("Loaded {} rows.", loaded.dataset.len()),
        };

        if let Some(bounds) = self.bounds {
            self.range = Some(crate::app::resolve_range(initial, bounds));
            self.recompute();
        }
    }

    fn recompute(&mut self) {
        let Some(range) = self.range else {
            return;
        };
        let view = build_view(&self.service.dataset().dataset, range);
        debug!("Range {}..{} -> {} rows", range.start, range.end, view.filtered.len());
        self.table = TableState::default().with_selected((!view.is_empty()).then_some(0));
        self.view = Some(view);
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        info!("Quit requested");
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.date_input.is_some() {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => self.field = self.field.toggle(),
            KeyCode::Left => self.shift_field(Shift::Days(-1)),
            KeyCode::Right => self.shift_field(Shift::Days(1)),
            KeyCode::Char('[') => self.shift_field(Shift::Months(-1)),
            KeyCode::Char(']') => self.shift_field(Shift::Months(1)),
            KeyCode::Enter if self.bounds.is_some() => {
                self.date_input = Some(String::new());
                self.status = format!(
                    "Editing {} date (YYYY-MM-DD). Enter to apply, Esc to cancel.",
                    self.field.label()
                );
            }
            KeyCode::Char('a') => {
                if let Some(bounds) = self.bounds {
                    self.range = Some(bounds);
                    self.recompute();
                    self.status = "Showing full range.".to_string();
                }
            }
            KeyCode::Char('j') | KeyCode::PageDown => self.scroll_table(1),
            KeyCode::Char('k') | KeyCode::PageUp => self.scroll_table(-1),
            _ => {}
        }
        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        let Some(buffer) = self.date_input.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.date_input = None;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let text = self.date_input.take().unwrap_or_default();
                self.apply_date_input(text.trim());
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => buffer.push(c),
            _ => {}
        }
    }

    fn apply_date_input(&mut self, text: &str) {
        let date = match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            Ok(d) => d,
            Err(e) => {
                self.status = format!("Invalid date '{text}': {e}");
                return;
            }
        };
        self.set_field(date);
    }

    fn shift_field(&mut self, shift: Shift) {
        let Some(range) = self.range else {
            return;
        };
        let current = match self.field {
            RangeField::Start => range.start,
            RangeField::End => range.end,
        };
        if let Some(next) = shift.apply(current) {
            self.set_field(next);
        }
    }

    fn set_field(&mut self, date: NaiveDate) {
        let (Some(range), Some(bounds)) = (self.range, self.bounds) else {
            return;
        };
        let next = match self.field {
            RangeField::Start => DateRange::new(date, range.end),
            RangeField::End => DateRange::new(range.start, date),
        }
        .clamp_to(bounds);
        self.range = Some(next);
        self.recompute();
        self.status = format!("{}: {}", self.field.label(), date);
    }

    fn scroll_table(&mut self, delta: i64) {
        let Some(view) = &self.view else {
            return;
        };
        let n = view.filtered.len();
        if n == 0 {
            return;
        }
        let cur = self.table.selected().unwrap_or(0) as i64;
        let next = (cur + delta).clamp(0, n as i64 - 1) as usize;
        self.table.select(Some(next));
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("realty", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" · 斗六市{} 實價登錄查詢", self.service.target_community())),
        ]));

        let selected = Style::default().fg(Color::Black).bg(Color::White);
        let normal = Style::default().fg(Color::Gray);
        let (start, end) = match self.range {
            Some(r) => (r.start.to_string(), r.end.to_string()),
            None => ("-".to_string(), "-".to_string()),
        };
        let editing = self.date_input.as_deref();
        let field_span = |field: RangeField, value: String| {
            let text = match editing {
                Some(buf) if self.field == field => format!("{buf}_"),
                _ => value,
            };
            Span::styled(text, if self.field == field { selected } else { normal })
        };
        lines.push(Line::from(vec![
            Span::raw("交易日期範圍: "),
            field_span(RangeField::Start, start),
            Span::raw(" → "),
            field_span(RangeField::End, end),
        ]));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let message = match (&self.view, self.bounds) {
            (_, None) if self.service.is_loaded() => Some((MSG_LOAD_FAILED, Color::Red)),
            (None, _) => Some(("Waiting for data...", Color::Yellow)),
            (Some(view), _) if view.is_empty() => Some((MSG_EMPTY_RANGE, Color::Yellow)),
            _ => None,
        };
        if let Some((msg, color)) = message {
            let block = Block::default().borders(Borders::ALL);
            let p = Paragraph::new(msg)
                .style(Style::default().fg(color))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(p, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Percentage(55),
                Constraint::Min(5),
            ])
            .split(area);

        self.draw_metrics(frame, chunks[0]);

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        self.draw_trend(frame, charts[0], TrendField::UnitPrice);
        self.draw_trend(frame, charts[1], TrendField::TotalPrice);

        self.draw_table(frame, chunks[2]);
    }

    fn draw_metrics(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(view) = &self.view else {
            return;
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(area);

        let metrics = [
            ("成交筆數", format_count(view.summary.count)),
            ("市場成交最多單價", format_unit_price(view.summary.mode_unit_price)),
            ("市場成交最多總價", format_total_price(view.summary.mode_total_price)),
        ];
        for ((title, value), rect) in metrics.into_iter().zip(cols.iter()) {
            let p = Paragraph::new(Span::styled(
                value,
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(p, *rect);
        }
    }

    fn draw_trend(&self, frame: &mut ratatui::Frame<'_>, area: Rect, field: TrendField) {
        let block = Block::default().title(field.title()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(view) = &self.view else {
            return;
        };
        let marker = match field {
            TrendField::UnitPrice => view.markers.unit_price,
            TrendField::TotalPrice => view.markers.total_price,
        };
        let series = trend_series(&view.trend, field);
        let Some((x_bounds, y_bounds)) = chart_bounds(&series, marker) else {
            let msg = Paragraph::new("No numeric values in range.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let widget = TrendChart {
            series: &series,
            marker,
            x_bounds,
            y_bounds,
            x_label: "成交時間",
            y_label: field.y_label(),
            fmt_x: fmt_axis_month,
            fmt_y: field.fmt_y(),
        };
        frame.render_widget(widget, inner);
    }

    fn draw_table(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(view) = &self.view else {
            return;
        };
        let header = Row::new(["社區", "交易日期", "日期", "單價(萬元/坪)", "總價(萬元)", "交易標的"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        let rows = view.filtered.iter().map(|r| {
            Row::new(vec![
                Cell::from(r.community_name.clone()),
                Cell::from(r.date_of_transaction_roc.clone()),
                Cell::from(r.date_of_transaction.map(|d| d.to_string()).unwrap_or_default()),
                Cell::from(crate::report::fmt_opt(r.unit_price_per_ping, 2)),
                Cell::from(crate::report::fmt_opt(r.total_price, 0)),
                Cell::from(truncate(&r.transaction_target, 24)),
            ])
        });
        let widths = [
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(11),
            Constraint::Length(14),
            Constraint::Length(11),
            Constraint::Min(10),
        ];
        let title = format!("原始數據表格 ({} 筆)", view.filtered.len());
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().title(title).borders(Borders::ALL))
            .row_highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_stateful_widget(table, area, &mut self.table);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab start/end  ←/→ ±day  [/] ±month  Enter type date  a all  j/k rows  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shift {
    Days(i64),
    Months(i32),
}

impl Shift {
    fn apply(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Shift::Days(n) if n >= 0 => date.checked_add_days(Days::new(n.unsigned_abs())),
            Shift::Days(n) => date.checked_sub_days(Days::new(n.unsigned_abs())),
            Shift::Months(n) if n >= 0 => date.checked_add_months(Months::new(n.unsigned_abs())),
            Shift::Months(n) => date.checked_sub_months(Months::new(n.unsigned_abs())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrendField {
    UnitPrice,
    TotalPrice,
}

impl TrendField {
    fn title(self) -> &'static str {
        match self {
            TrendField::UnitPrice => "成交單價趨勢 (按月平均)",
            TrendField::TotalPrice => "總價趨勢 (按月平均)",
        }
    }

    fn y_label(self) -> &'static str {
        match self {
            TrendField::UnitPrice => "單價 (萬元/坪)",
            TrendField::TotalPrice => "總價 (萬元)",
        }
    }

    fn fmt_y(self) -> fn(f64) -> String {
        match self {
            TrendField::UnitPrice => fmt_axis_2dp,
            TrendField::TotalPrice => fmt_axis_0dp,
        }
    }
}

/// Chart x is the month's day number since 0001-01-01, so spacing follows the calendar.
fn month_to_x(month: NaiveDate) -> f64 {
    month.num_days_from_ce() as f64
}

fn trend_series(trend: &[MonthlyTrendPoint], field: TrendField) -> Vec<(f64, f64)> {
    trend
        .iter()
        .filter_map(|p| {
            let y = match field {
                TrendField::UnitPrice => p.mean_unit_price,
                TrendField::TotalPrice => p.mean_total_price,
            }?;
            Some((month_to_x(p.month), y))
        })
        .collect()
}

/// Padded axis bounds covering the series and the marker.
fn chart_bounds(series: &[(f64, f64)], marker: Option<f64>) -> Option<([f64; 2], [f64; 2])> {
    let (first, last) = (series.first()?, series.last()?);
    let (mut x0, mut x1) = (first.0, last.0);
    if x1 <= x0 {
        // Single month: widen by half a month either side.
        x0 -= 15.0;
        x1 += 15.0;
    }

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for y in series.iter().map(|&(_, y)| y).chain(marker) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if y_max <= y_min {
        let pad = (y_min.abs() * 0.1).max(1.0);
        return Some(([x0, x1], [y_min - pad, y_max + pad]));
    }
    let pad = (y_max - y_min) * 0.05;
    Some(([x0, x1], [y_min - pad, y_max + pad]))
}

fn fmt_axis_month(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn fmt_axis_2dp(v: f64) -> String {
    format!("{v:.2}")
}

fn fmt_axis_0dp(v: f64) -> String {
    format!("{v:.0}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryStore;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loaded_app() -> App {
        let csv = "社區簡稱,交易日期,單價(萬元/坪),總價(萬元),交易標的\n\
                   X,101/01/15,100,1000,房地\n\
                   X,101/02/15,100,1000,房地\n\
                   X,101/02/20,200,2000,房地\n";
        let store = MemoryStore::new().with_object("b", "p", csv);
        let mut app = App::new(DatasetService::new(Box::new(store), "b", "p", "X"));
        app.load(&RangeArgs::default());
        app
    }

    #[test]
    fn load_seeds_full_range() {
        let app = loaded_app();
        assert_eq!(app.range, Some(DateRange::new(ymd(2012, 1, 15), ymd(2012, 2, 20))));
        assert_eq!(app.view.as_ref().map(|v| v.summary.count), Some(3));
    }

    #[test]
    fn editing_end_date_refilters() {
        let mut app = loaded_app();
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.field, RangeField::End);
        app.handle_key(KeyCode::Enter);
        for c in "2012-02-15".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter);
        assert!(app.date_input.is_none());
        assert_eq!(app.view.as_ref().map(|v| v.summary.count), Some(2));
    }

    #[test]
    fn start_after_end_shows_empty_view() {
        let mut app = loaded_app();
        // Push start forward and end back until they cross.
        app.handle_key(KeyCode::Char(']'));
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Char('['));
        let range = app.range.unwrap();
        assert_eq!(range.start, ymd(2012, 2, 15));
        assert_eq!(range.end, ymd(2012, 1, 20));
        assert!(app.view.as_ref().unwrap().is_empty());
    }

    #[test]
    fn load_failure_leaves_no_range() {
        let mut app = App::new(DatasetService::new(Box::new(MemoryStore::new()), "b", "p", "X"));
        app.load(&RangeArgs::default());
        assert!(app.range.is_none());
        assert!(app.status.starts_with("Load error"));
    }

    #[test]
    fn shift_handles_month_ends() {
        assert_eq!(Shift::Months(1).apply(ymd(2012, 1, 31)), Some(ymd(2012, 2, 29)));
        assert_eq!(Shift::Days(-1).apply(ymd(2012, 3, 1)), Some(ymd(2012, 2, 29)));
    }

    #[test]
    fn bounds_include_marker_and_pad_single_month() {
        let series = vec![(month_to_x(ymd(2012, 1, 1)), 100.0)];
        let (x, y) = chart_bounds(&series, Some(150.0)).unwrap();
        assert!(x[1] > x[0]);
        assert!(y[0] < 100.0 && y[1] > 150.0);
        assert!(chart_bounds(&[], Some(1.0)).is_none());
        assert_eq!(fmt_axis_month(month_to_x(ymd(2012, 2, 1))), "2012-02");
    }
}
