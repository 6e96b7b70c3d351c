//! Plotters-powered trend chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//! - layering several series on one mesh is a single `draw_series` each
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.
//! The x axis is a month index (`year * 12 + month0`) so monthly points are
//! evenly spaced; `fmt_month_index` turns it back into `YYYY-MM`.

use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// High-contrast palette for terminal rendering, cycled per series.
pub const PALETTE: [(u8, u8, u8); 5] = [
    (0, 255, 255), // cyan
    (255, 200, 0), // amber
    (0, 255, 0),   // green
    (255, 0, 255), // magenta
    (255, 80, 80), // red
];

/// One line on the chart.
pub struct ChartLine {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub color: (u8, u8, u8),
}

/// Ratatui color matching a palette entry (for legends drawn outside Plotters).
pub fn palette_color(idx: usize) -> Color {
    let (r, g, b) = PALETTE[idx % PALETTE.len()];
    Color::Rgb(r, g, b)
}

pub fn month_index(date: NaiveDate) -> f64 {
    (date.year() * 12 + date.month0() as i32) as f64
}

pub fn fmt_month_index(v: f64) -> String {
    let idx = v.round() as i32;
    format!("{}-{:02}", idx.div_euclid(12), idx.rem_euclid(12) + 1)
}

/// Axis bounds covering every point, padded so flat or single-point lines still draw.
pub fn chart_bounds(lines: &[ChartLine]) -> Option<([f64; 2], [f64; 2])> {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in lines.iter().flat_map(|l| l.points.iter()) {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !(x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite()) {
        return None;
    }

    if x_max <= x_min {
        x_min -= 1.0;
        x_max += 1.0;
    }
    let pad = if y_max > y_min {
        (y_max - y_min) * 0.05
    } else {
        y_min.abs().max(1.0) * 0.05
    };
    Some(([x_min, x_max], [y_min - pad, y_max + pad]))
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call so `render()`
/// stays focused on drawing.
pub struct TrendChart<'a> {
    pub lines: &'a [ChartLine],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for TrendChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
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
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are clutter at terminal resolution; axes + labels suffice.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("month")
                .y_desc(&self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_month_index(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for line in self.lines {
                let (r, g, b) = line.color;
                let color = RGBColor(r, g, b);
                chart.draw_series(LineSeries::new(line.points.iter().copied(), &color))?;
                // Pixels rather than `Circle`: the backend maps circle radii to
                // canvas units incorrectly and draws huge markers.
                chart.draw_series(line.points.iter().map(|&(x, y)| Pixel::new((x, y), color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
