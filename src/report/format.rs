//! Value formatting and plain-text report output.
//!
//! We keep formatting code in one place so:
//! - the data-prep code stays clean and testable
//! - output changes are localized (the tests below pin the layout)

use crate::collect::CollectReport;
use crate::domain::{Catalog, DateRange, Observation, Unit};
use crate::present::{LatestChange, SeriesMetrics, SeriesView};

/// Display a value in its series unit.
///
/// - percentage: `3.70%`
/// - count: `159,288.00`
/// - currency: `$35.12`
pub fn format_value(value: f64, unit: Unit) -> String {
    match unit {
        Unit::Percentage => format!("{value:.2}%"),
        Unit::Count => group_thousands(value, 2),
        Unit::Currency => {
            let body = group_thousands(value.abs(), 2);
            if value < 0.0 { format!("-${body}") } else { format!("${body}") }
        }
    }
}

/// Like `format_value`, with an explicit sign (`+0.10%`, `-1,234.00`).
pub fn format_change(change: f64, unit: Unit) -> String {
    let sign = if shows_negative(change) { "-" } else { "+" };
    let magnitude = format_value(change.abs(), unit);
    format!("{sign}{magnitude}")
}

/// Whether `change` still reads negative at two decimals.
///
/// Tiny negative changes that round to zero count as non-negative.
pub fn shows_negative(change: f64) -> bool {
    group_thousands(change, 2).starts_with('-')
}

/// Signed percent change with two decimals (`+10.00%`).
pub fn format_pct_change(pct: f64) -> String {
    format!("{pct:+.2}%")
}

/// Fixed-decimal rendering with `,` thousands separators.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(raw.len() + digits.len() / 3 + 1);
    for (i, &b) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(b as char);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    // "-0.00" reads oddly; only negative when something non-zero survived rounding.
    let is_zero = raw.bytes().all(|b| b == b'0' || b == b'.');
    if value < 0.0 && !is_zero {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Format the metric summary for one series.
pub fn format_series_summary(view: &SeriesView, range: Option<DateRange>) -> String {
    let unit = view.unit();
    let mut out = String::new();

    out.push_str(&format!("=== {} ({}) ===\n", view.series.name, view.series.id));
    match range {
        Some(r) => out.push_str(&format!("Range: {} .. {}\n", month_label(r.start), month_label(r.end))),
        None => out.push_str("Range: all\n"),
    }

    match &view.metrics {
        SeriesMetrics::NoData => {
            out.push_str("No data for the selected range.\n");
        }
        SeriesMetrics::Summary(s) => {
            out.push_str(&format!(
                "Latest:  {} ({})\n",
                format_value(s.latest, unit),
                month_label(s.latest_date)
            ));
            match (s.prior, s.prior_date) {
                (Some(prior), Some(date)) => out.push_str(&format!(
                    "Prior:   {} ({})\n",
                    format_value(prior, unit),
                    month_label(date)
                )),
                _ => out.push_str("Prior:   -\n"),
            }
            out.push_str(&format!(
                "Change:  {} ({})\n",
                format_change(s.change, unit),
                format_pct_change(s.pct_change)
            ));
            out.push_str(&format!(
                "Span:    n={} | min={} | max={}\n",
                s.rows,
                format_value(s.min, unit),
                format_value(s.max, unit)
            ));
        }
    }

    out
}

/// Format raw rows as a table.
pub fn format_rows_table(rows: &[Observation], catalog: &Catalog) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!("{:<10} {:<32} {:<6} {:<10} {:>16}", "date", "series", "period", "name", "value"),
    );
    push_line(
        &mut out,
        format!("{:-<10} {:-<32} {:-<6} {:-<10} {:->16}", "", "", "", "", ""),
    );
    for r in rows {
        push_line(
            &mut out,
            format!(
                "{:<10} {:<32} {:<6} {:<10} {:>16}",
                r.date.format("%Y-%m-%d"),
                truncate(&r.series_name, 32),
                r.period,
                truncate(&r.period_name, 10),
                format_value(r.value, catalog.unit_for_id(&r.series_id)),
            ),
        );
    }
    out
}

/// Format the latest month-over-month change per sector.
pub fn format_sector_table(latest: &[LatestChange], catalog: &Catalog) -> String {
    if latest.is_empty() {
        return "No data for the selected range.\n".to_string();
    }

    let mut out = String::new();
    push_line(
        &mut out,
        format!("{:<32} {:<8} {:>16} {:>14}", "series", "month", "value", "mom change"),
    );
    push_line(&mut out, format!("{:-<32} {:-<8} {:->16} {:->14}", "", "", "", ""));
    for l in latest {
        let unit = catalog.by_id(&l.series_id).map(|s| s.unit).unwrap_or(Unit::Count);
        push_line(
            &mut out,
            format!(
                "{:<32} {:<8} {:>16} {:>14}",
                truncate(&l.series_name, 32),
                month_label(l.date),
                format_value(l.value, unit),
                format_change(l.change, unit),
            ),
        );
    }
    out
}

/// Format the configured catalog.
pub fn format_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();
    push_line(&mut out, format!("{:<16} {:<32} {:<10}", "id", "name", "unit"));
    push_line(&mut out, format!("{:-<16} {:-<32} {:-<10}", "", "", ""));
    for s in catalog.iter() {
        let unit = format!("{:?}", s.unit).to_lowercase();
        push_line(&mut out, format!("{:<16} {:<32} {:<10}", s.id, truncate(&s.name, 32), unit));
    }
    out
}

/// Format the outcome of a collection run.
pub fn format_collect_report(report: &CollectReport) -> String {
    let mut out = String::new();
    for o in &report.outcomes {
        match &o.result {
            Ok(n) => out.push_str(&format!("  ok    {:<16} {:<32} {n} rows\n", o.series_id, o.series_name)),
            Err(msg) => out.push_str(&format!("  FAIL  {:<16} {:<32} {msg}\n", o.series_id, o.series_name)),
        }
    }
    out.push_str(&format!(
        "Store: {} | rows before={} fetched={} after={}",
        report.store_path.display(),
        report.rows_before,
        report.rows_fetched,
        report.rows_after
    ));
    let failed = report.failed_count();
    if failed > 0 {
        out.push_str(&format!(" | {failed} series skipped"));
    }
    out.push('\n');
    out
}

pub fn month_label(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_catalog;
    use crate::domain::SeriesDef;
    use crate::present::compute_metrics;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn values_format_by_unit() {
        assert_eq!(format_value(3.7, Unit::Percentage), "3.70%");
        assert_eq!(format_value(159_288.0, Unit::Count), "159,288.00");
        assert_eq!(format_value(35.124, Unit::Currency), "$35.12");
        assert_eq!(format_value(1_234_567.891, Unit::Currency), "$1,234,567.89");
        assert_eq!(format_value(-4_321.5, Unit::Count), "-4,321.50");
    }

    #[test]
    fn changes_are_signed() {
        assert_eq!(format_change(0.1, Unit::Percentage), "+0.10%");
        assert_eq!(format_change(-1_234.0, Unit::Count), "-1,234.00");
        assert_eq!(format_change(0.0, Unit::Currency), "+$0.00");
        assert_eq!(format_change(-0.001, Unit::Count), "+0.00");
        assert_eq!(format_change(-0.004, Unit::Percentage), "+0.00%");
        assert_eq!(format_change(-0.005, Unit::Currency), "-$0.01");
        assert!(!shows_negative(-0.001));
        assert!(shows_negative(-0.01));
        assert_eq!(format_pct_change(10.0), "+10.00%");
        assert_eq!(format_pct_change(-2.5), "-2.50%");
    }

    #[test]
    fn thousands_grouping_edges() {
        assert_eq!(group_thousands(0.0, 2), "0.00");
        assert_eq!(group_thousands(999.999, 2), "1,000.00");
        assert_eq!(group_thousands(100.0, 0), "100");
        assert_eq!(group_thousands(1000.0, 0), "1,000");
        assert_eq!(group_thousands(-0.001, 2), "0.00");
    }

    #[test]
    fn summary_layout() {
        let def = SeriesDef::new("LNS14000000", "Unemployment Rate", Unit::Percentage);
        let rows: Vec<Observation> = [(1, 3.7), (2, 3.9)]
            .iter()
            .map(|&(m, v)| Observation::monthly(&def, 2024, &format!("M{m:02}"), "Month", v).unwrap())
            .collect();
        let view = SeriesView {
            series: def,
            metrics: compute_metrics(&rows),
            rows,
        };
        let expected = concat!(
            "=== Unemployment Rate (LNS14000000) ===\n",
            "Range: all\n",
            "Latest:  3.90% (2024-02)\n",
            "Prior:   3.70% (2024-01)\n",
            "Change:  +0.20% (+5.41%)\n",
            "Span:    n=2 | min=3.70% | max=3.90%\n",
        );
        assert_eq!(format_series_summary(&view, None), expected);
    }

    #[test]
    fn summary_no_data() {
        let view = SeriesView {
            series: SeriesDef::new("X", "Ex", Unit::Count),
            rows: Vec::new(),
            metrics: SeriesMetrics::NoData,
        };
        let d = |m| NaiveDate::from_ymd_opt(2010, m, 1).unwrap();
        let range = DateRange::new(d(1), d(6)).unwrap();
        let txt = format_series_summary(&view, Some(range));
        assert!(txt.contains("Range: 2010-01 .. 2010-06"));
        assert!(txt.contains("No data for the selected range."));
    }

    #[test]
    fn sector_table_uses_catalog_units() {
        let catalog = Catalog::new(default_catalog()).unwrap();
        let latest = vec![LatestChange {
            series_id: "CES3000000001".to_string(),
            series_name: "Manufacturing Employment".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            value: 12_960.0,
            change: -8.0,
        }];
        let txt = format_sector_table(&latest, &catalog);
        let row = txt.lines().nth(2).unwrap();
        assert!(row.starts_with("Manufacturing Employment"));
        assert!(row.contains("2024-05"));
        assert!(row.contains("12,960.00"));
        assert!(row.ends_with("-8.00"));
    }

    #[test]
    fn catalog_listing_includes_units() {
        let catalog = Catalog::new(default_catalog()).unwrap();
        let txt = format_catalog(&catalog);
        assert!(txt.lines().any(|l| l.starts_with("LNS14000000") && l.ends_with("percentage")));
        assert_eq!(txt.lines().count(), 2 + 6);
    }
}
