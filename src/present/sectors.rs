//! Sector comparison: month-over-month change for a fixed set of series.

use chrono::NaiveDate;

use crate::domain::{DateRange, Observation, SeriesDef};

/// One month of a series with its change from the previous row.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyChange {
    pub series_id: String,
    pub series_name: String,
    pub date: NaiveDate,
    pub value: f64,
    /// `None` for the first row of each series.
    pub change: Option<f64>,
}

/// Most recent change of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestChange {
    pub series_id: String,
    pub series_name: String,
    pub date: NaiveDate,
    pub value: f64,
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectorComparison {
    /// Full history, grouped by series (in requested order), ascending by date.
    pub history: Vec<MonthlyChange>,
    /// Latest change per series; series with fewer than two rows are omitted.
    pub latest: Vec<LatestChange>,
}

impl SectorComparison {
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// History rows of one series.
    pub fn series_history<'a>(&'a self, series_id: &'a str) -> impl Iterator<Item = &'a MonthlyChange> + 'a {
        self.history.iter().filter(move |h| h.series_id == series_id)
    }
}

/// Build the comparison for `sectors` over `rows`, optionally restricted to `range`.
pub fn sector_comparison(rows: &[Observation], sectors: &[&SeriesDef], range: Option<DateRange>) -> SectorComparison {
    let mut out = SectorComparison::default();

    for sector in sectors {
        let mut series: Vec<&Observation> = rows
            .iter()
            .filter(|r| r.series_id == sector.id)
            .filter(|r| range.is_none_or(|range| range.contains(r.date)))
            .collect();
        series.sort_by_key(|r| r.date);

        let start = out.history.len();
        let mut prev: Option<f64> = None;
        for row in series {
            out.history.push(MonthlyChange {
                series_id: row.series_id.clone(),
                series_name: row.series_name.clone(),
                date: row.date,
                value: row.value,
                change: prev.map(|p| row.value - p),
            });
            prev = Some(row.value);
        }

        if let Some(last) = out.history[start..].last() {
            if let Some(change) = last.change {
                out.latest.push(LatestChange {
                    series_id: last.series_id.clone(),
                    series_name: last.series_name.clone(),
                    date: last.date,
                    value: last.value,
                    change,
                });
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Unit;

    fn obs(id: &str, m: u32, value: f64) -> Observation {
        Observation {
            series_id: id.to_string(),
            series_name: format!("Name {id}"),
            year: 2024,
            period: format!("M{m:02}"),
            period_name: "Month".to_string(),
            value,
            date: NaiveDate::from_ymd_opt(2024, m, 1).unwrap(),
        }
    }

    #[test]
    fn shift_by_one_change_per_series() {
        let rows = vec![
            obs("MFG", 2, 12_960.0),
            obs("LEI", 1, 16_800.0),
            obs("MFG", 1, 12_950.0),
            obs("LEI", 2, 16_790.0),
            obs("MFG", 3, 12_940.0),
        ];
        let mfg = SeriesDef::new("MFG", "Name MFG", Unit::Count);
        let lei = SeriesDef::new("LEI", "Name LEI", Unit::Count);
        let cmp = sector_comparison(&rows, &[&mfg, &lei], None);

        let mfg_changes: Vec<Option<f64>> = cmp.series_history("MFG").map(|h| h.change).collect();
        assert_eq!(mfg_changes, vec![None, Some(10.0), Some(-20.0)]);

        assert_eq!(cmp.latest.len(), 2);
        assert_eq!(cmp.latest[0].series_id, "MFG");
        assert_eq!(cmp.latest[0].change, -20.0);
        assert_eq!(cmp.latest[1].series_id, "LEI");
        assert_eq!(cmp.latest[1].change, -10.0);
    }

    #[test]
    fn single_row_series_has_no_latest_change() {
        let rows = vec![obs("MFG", 1, 1.0), obs("LEI", 1, 2.0), obs("LEI", 2, 3.0)];
        let mfg = SeriesDef::new("MFG", "Name MFG", Unit::Count);
        let lei = SeriesDef::new("LEI", "Name LEI", Unit::Count);
        let cmp = sector_comparison(&rows, &[&mfg, &lei], None);
        assert_eq!(cmp.history.len(), 3);
        assert_eq!(cmp.latest.len(), 1);
        assert_eq!(cmp.latest[0].series_id, "LEI");
    }

    #[test]
    fn range_limits_history() {
        let rows = vec![obs("MFG", 1, 1.0), obs("MFG", 2, 2.0), obs("MFG", 3, 4.0)];
        let mfg = SeriesDef::new("MFG", "Name MFG", Unit::Count);
        let d = |m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
        let range = DateRange::new(d(2), d(3)).unwrap();
        let cmp = sector_comparison(&rows, &[&mfg], Some(range));
        assert_eq!(cmp.history.len(), 2);
        assert_eq!(cmp.history[0].change, None);
        assert_eq!(cmp.latest[0].change, 2.0);
    }

    #[test]
    fn no_rows_is_empty() {
        let mfg = SeriesDef::new("MFG", "Name MFG", Unit::Count);
        assert!(sector_comparison(&[], &[&mfg], None).is_empty());
    }
}
