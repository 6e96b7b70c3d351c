//! Latest-value and period-over-period metrics for one series.

use chrono::NaiveDate;

use crate::domain::Observation;

/// Metrics over a filtered, date-sorted series.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesMetrics {
    /// The selection is empty; nothing to compute.
    NoData,
    Summary(MetricSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    pub latest: f64,
    pub latest_date: NaiveDate,
    /// Second-to-last value, when at least two rows exist.
    pub prior: Option<f64>,
    pub prior_date: Option<NaiveDate>,
    /// `latest - prior`, or 0 with fewer than two rows.
    pub change: f64,
    /// `change / prior * 100`, or 0 with fewer than two rows or a zero prior.
    pub pct_change: f64,
    pub min: f64,
    pub max: f64,
    pub rows: usize,
}

impl SeriesMetrics {
    pub fn summary(&self) -> Option<&MetricSummary> {
        match self {
            SeriesMetrics::NoData => None,
            SeriesMetrics::Summary(s) => Some(s),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SeriesMetrics::NoData)
    }
}

/// Compute metrics for rows already restricted to one series and sorted by date.
pub fn compute_metrics(rows: &[Observation]) -> SeriesMetrics {
    let Some(last) = rows.last() else {
        return SeriesMetrics::NoData;
    };

    let prior_row = rows.len().checked_sub(2).and_then(|i| rows.get(i));
    let (change, pct_change) = match prior_row {
        Some(prior) => period_change(prior.value, last.value),
        None => (0.0, 0.0),
    };

    let (min, max) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
        (lo.min(r.value), hi.max(r.value))
    });

    SeriesMetrics::Summary(MetricSummary {
        latest: last.value,
        latest_date: last.date,
        prior: prior_row.map(|r| r.value),
        prior_date: prior_row.map(|r| r.date),
        change,
        pct_change,
        min,
        max,
        rows: rows.len(),
    })
}

/// Absolute and percent change from `prior` to `latest`.
///
/// A zero prior gives a percent change of 0.
pub fn period_change(prior: f64, latest: f64) -> (f64, f64) {
    let change = latest - prior;
    let pct = if prior == 0.0 { 0.0 } else { change / prior * 100.0 };
    (change, pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<Observation> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let m = i as u32 + 1;
                Observation {
                    series_id: "S".to_string(),
                    series_name: "Series".to_string(),
                    year: 2024,
                    period: format!("M{m:02}"),
                    period_name: "Month".to_string(),
                    value,
                    date: NaiveDate::from_ymd_opt(2024, m, 1).unwrap(),
                }
            })
            .collect()
    }

    #[test]
    fn two_rows_give_change_and_percent_change() {
        let m = compute_metrics(&series(&[100.0, 110.0]));
        let s = m.summary().unwrap();
        assert_eq!(s.latest, 110.0);
        assert_eq!(s.prior, Some(100.0));
        assert!((s.change - 10.0).abs() < 1e-12);
        assert_eq!(format!("{:.2}", s.pct_change), "10.00");
    }

    #[test]
    fn single_row_has_zero_change() {
        let m = compute_metrics(&series(&[42.0]));
        let s = m.summary().unwrap();
        assert_eq!(s.latest, 42.0);
        assert_eq!(s.prior, None);
        assert_eq!(s.change, 0.0);
        assert_eq!(s.pct_change, 0.0);
    }

    #[test]
    fn empty_rows_are_no_data() {
        assert_eq!(compute_metrics(&[]), SeriesMetrics::NoData);
        assert!(compute_metrics(&[]).is_empty());
    }

    #[test]
    fn uses_last_two_rows_only() {
        let s = compute_metrics(&series(&[5.0, 1.0, 4.0, 3.0])).summary().cloned().unwrap();
        assert_eq!(s.prior, Some(4.0));
        assert!((s.change + 1.0).abs() < 1e-12);
        assert!((s.pct_change + 25.0).abs() < 1e-12);
        assert_eq!((s.min, s.max), (1.0, 5.0));
        assert_eq!(s.rows, 4);
    }

    #[test]
    fn zero_prior_does_not_divide() {
        let (change, pct) = period_change(0.0, 3.0);
        assert_eq!(change, 3.0);
        assert_eq!(pct, 0.0);
    }
}
