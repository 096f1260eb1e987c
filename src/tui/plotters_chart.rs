//! Plotters-powered monthly trend chart widget for Ratatui.
//!
//! One line series (monthly means, with point dots) plus an optional dashed
//! horizontal reference rule. Rendered into the Ratatui buffer through
//! `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Number of dash/gap pairs in the reference rule.
const RULE_DASHES: usize = 24;

/// A render-only chart description; series and bounds are computed by the caller.
pub struct TrendChart<'a> {
    /// `(x, y)` points of the monthly means, ascending by x.
    pub series: &'a [(f64, f64)],
    /// Y value of the reference rule, if any.
    pub marker: Option<f64>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for TrendChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let line_color = RGBColor(0, 255, 255); // cyan
            let rule_color = RGBColor(255, 0, 0); // red

            chart.draw_series(LineSeries::new(self.series.iter().copied(), &line_color))?;
            // Pixel dots instead of `Circle`: the backend scales circle radii badly.
            chart.draw_series(self.series.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            if let Some(y) = self.marker {
                chart.draw_series(
                    dash_segments(x0, x1, RULE_DASHES)
                        .into_iter()
                        .map(|(a, b)| PathElement::new(vec![(a, y), (b, y)], &rule_color)),
                )?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Split `[x0, x1]` into `dashes` visible segments separated by equal gaps.
fn dash_segments(x0: f64, x1: f64, dashes: usize) -> Vec<(f64, f64)> {
    if dashes == 0 || x1 <= x0 {
        return Vec::new();
    }
    let step = (x1 - x0) / (2 * dashes - 1) as f64;
    (0..dashes)
        .map(|i| {
            let a = x0 + step * (2 * i) as f64;
            (a, (a + step).min(x1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashes_span_the_axis() {
        let segs = dash_segments(0.0, 7.0, 4);
        assert_eq!(segs.len(), 4);
        assert_eq!(segs[0], (0.0, 1.0));
        assert_eq!(segs[3], (6.0, 7.0));
        assert!(dash_segments(1.0, 1.0, 4).is_empty());
    }
}
