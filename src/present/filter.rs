//! Series/date filtering over the loaded store.

use crate::domain::{Catalog, DateRange, Observation};
use crate::error::AppError;

/// What the user asked to look at.
///
/// Series are selected by id; display names are resolved through the catalog
/// first, so rows stored under an older name still match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub series_ids: Vec<String>,
    /// Inclusive window; `None` means the full span of the data.
    pub range: Option<DateRange>,
}

impl Selection {
    pub fn single(series_id: impl Into<String>) -> Self {
        Self {
            series_ids: vec![series_id.into()],
            range: None,
        }
    }

    pub fn many<I, S>(series_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            series_ids: series_ids.into_iter().map(Into::into).collect(),
            range: None,
        }
    }

    /// Select series by name or id, as typed by the user.
    pub fn resolve<I, S>(catalog: &Catalog, references: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let series_ids = references
            .into_iter()
            .map(|r| catalog.resolve(r.as_ref()).map(|s| s.id.clone()))
            .collect::<Result<_, _>>()?;
        Ok(Self { series_ids, range: None })
    }

    pub fn with_range(mut self, range: Option<DateRange>) -> Self {
        self.range = range;
        self
    }

    fn wants(&self, series_id: &str) -> bool {
        self.series_ids.iter().any(|id| id == series_id)
    }
}

/// Rows of the selected series inside the selected range, ascending by date
/// (ties broken by series id).
pub fn filter_rows(rows: &[Observation], selection: &Selection) -> Vec<Observation> {
    let mut out: Vec<Observation> = rows
        .iter()
        .filter(|r| selection.wants(&r.series_id))
        .filter(|r| selection.range.is_none_or(|range| range.contains(r.date)))
        .cloned()
        .collect();
    out.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.series_id.cmp(&b.series_id)));
    out
}

/// Date bounds of the selected series ignoring any range (for range pickers).
pub fn selection_bounds(rows: &[Observation], selection: &Selection) -> Option<DateRange> {
    let all = filter_rows(rows, &Selection { range: None, ..selection.clone() });
    DateRange::spanning(&all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SeriesDef, Unit};
    use chrono::NaiveDate;

    const UNRATE: &str = "LNS14000000";
    const MANUFACTURING: &str = "CES3000000001";

    fn obs(name: &str, y: i32, m: u32, value: f64) -> Observation {
        let series_id = if name.contains("Manufacturing") { MANUFACTURING } else { UNRATE };
        Observation {
            series_id: series_id.to_string(),
            series_name: name.to_string(),
            year: y,
            period: format!("M{m:02}"),
            period_name: "Month".to_string(),
            value,
            date: NaiveDate::from_ymd_opt(y, m, 1).unwrap(),
        }
    }

    fn table() -> Vec<Observation> {
        vec![
            obs("Unemployment Rate", 2024, 3, 3.8),
            obs("Manufacturing Employment", 2024, 1, 12_950.0),
            obs("Unemployment Rate", 2023, 12, 3.7),
            obs("Unemployment Rate", 2024, 1, 3.7),
            obs("Unemployment Rate", 2024, 2, 3.9),
        ]
    }

    #[test]
    fn full_range_returns_only_selected_series_ascending() {
        let rows = filter_rows(&table(), &Selection::single(UNRATE));
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.series_id == UNRATE));
        assert!(rows.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn range_is_inclusive() {
        let d = |y, m| NaiveDate::from_ymd_opt(y, m, 1).unwrap();
        let range = DateRange::new(d(2024, 1), d(2024, 2)).unwrap();
        let rows = filter_rows(
            &table(),
            &Selection::single(UNRATE).with_range(Some(range)),
        );
        let values: Vec<f64> = rows.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![3.7, 3.9]);
    }

    #[test]
    fn empty_range_yields_no_rows() {
        let d = |y, m| NaiveDate::from_ymd_opt(y, m, 1).unwrap();
        let range = DateRange::new(d(2010, 1), d(2010, 12)).unwrap();
        let rows = filter_rows(&table(), &Selection::single(UNRATE).with_range(Some(range)));
        assert!(rows.is_empty());
    }

    #[test]
    fn multi_select_interleaves_by_date() {
        let rows = filter_rows(
            &table(),
            &Selection::many([UNRATE, MANUFACTURING]),
        );
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1].series_name, "Manufacturing Employment");
        assert_eq!(rows[2].series_name, "Unemployment Rate");
    }

    #[test]
    fn bounds_ignore_the_current_range() {
        let d = |y, m| NaiveDate::from_ymd_opt(y, m, 1).unwrap();
        let sel = Selection::single(UNRATE)
            .with_range(Some(DateRange::new(d(2024, 2), d(2024, 2)).unwrap()));
        let bounds = selection_bounds(&table(), &sel).unwrap();
        assert_eq!(bounds.start, d(2023, 12));
        assert_eq!(bounds.end, d(2024, 3));
    }

    #[test]
    fn rows_under_an_older_name_still_match_by_id() {
        let mut rows = table();
        rows.push(obs("Jobless Rate", 2022, 12, 3.5));
        let catalog = Catalog::new(vec![SeriesDef::new(UNRATE, "Unemployment Rate", Unit::Percentage)]).unwrap();

        let sel = Selection::resolve(&catalog, ["unemployment rate"]).unwrap();
        assert_eq!(sel.series_ids, vec![UNRATE.to_string()]);
        let picked = filter_rows(&rows, &sel);
        assert_eq!(picked.len(), 5);
        assert_eq!(picked[0].series_name, "Jobless Rate");

        assert!(Selection::resolve(&catalog, ["Jobless Rate"]).is_err());
    }
}
