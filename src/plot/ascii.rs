//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - series line: `-`
//! - observed months: `o`

use chrono::Datelike;

use crate::domain::{Observation, Unit};
use crate::report::{format_value, month_label};

/// Render a trend plot for one date-sorted series.
pub fn render_trend_plot(rows: &[Observation], unit: Unit, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return "Plot: no data for the selected range\n".to_string();
    };

    let points: Vec<(f64, f64)> = rows.iter().map(|r| (month_index(r.date), r.value)).collect();
    let (x_min, x_max) = x_range(&points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(&points).unwrap_or_else(|| flat_range(first.value));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the line first so points can overlay.
    let mut prev = None;
    for &(x, y) in &points {
        let cx = map_x(x, x_min, x_max, width);
        let cy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(&mut grid, x0, y0, cx, cy, '-');
        }
        prev = Some((cx, cy));
    }
    for &(x, y) in &points {
        grid[map_y(y, y_min, y_max, height)][map_x(x, x_min, x_max, width)] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: date=[{}, {}] | y=[{}, {}]\n",
        month_label(first.date),
        month_label(last.date),
        format_value(y_min, unit),
        format_value(y_max, unit),
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn month_index(date: chrono::NaiveDate) -> f64 {
    (date.year() * 12 + date.month0() as i32) as f64
}

fn x_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

fn y_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

/// Range around a constant series so it renders mid-height.
fn flat_range(v: f64) -> (f64, f64) {
    let half = (v.abs() * 0.01).max(1.0);
    (v - half, v + half)
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
