//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - persisted to the CSV store
//! - filtered and reduced in memory by the presenter
//! - declared in the TOML config (the series catalog)

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Display unit of a series, fixed when the catalog is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Rates and shares, already expressed in percent (e.g. `3.7`).
    Percentage,
    /// Headcounts and other plain quantities.
    Count,
    /// Dollar amounts.
    Currency,
}

impl Unit {
    pub fn label(self) -> &'static str {
        match self {
            Unit::Percentage => "%",
            Unit::Count => "count",
            Unit::Currency => "USD",
        }
    }
}

/// One entry of the series catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesDef {
    /// Identifier assigned by the upstream source.
    pub id: String,
    /// Human-readable label written to the store.
    pub name: String,
    pub unit: Unit,
}

impl SeriesDef {
    pub fn new(id: &str, name: &str, unit: Unit) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            unit,
        }
    }
}

/// Ordered, id-unique list of series to collect and present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    series: Vec<SeriesDef>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids or names.
    pub fn new(series: Vec<SeriesDef>) -> Result<Self, AppError> {
        for (i, def) in series.iter().enumerate() {
            if def.id.trim().is_empty() || def.name.trim().is_empty() {
                return Err(AppError::config("Series entries need a non-empty id and name."));
            }
            for other in &series[..i] {
                if other.id == def.id {
                    return Err(AppError::config(format!("Duplicate series id in catalog: {}", def.id)));
                }
                if other.name.eq_ignore_ascii_case(&def.name) {
                    return Err(AppError::config(format!(
                        "Duplicate series name in catalog: {}",
                        def.name
                    )));
                }
            }
        }
        Ok(Self { series })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesDef> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SeriesDef> {
        self.series.get(index)
    }

    pub fn by_id(&self, id: &str) -> Option<&SeriesDef> {
        self.series.iter().find(|s| s.id == id)
    }

    /// Case-insensitive lookup by display name.
    pub fn by_name(&self, name: &str) -> Option<&SeriesDef> {
        let name = name.trim();
        self.series.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Resolve a user-supplied series reference (name or id).
    pub fn resolve(&self, reference: &str) -> Result<&SeriesDef, AppError> {
        self.by_name(reference)
            .or_else(|| self.by_id(reference.trim()))
            .ok_or_else(|| {
                AppError::invalid_input(format!(
                    "Unknown series '{reference}'. Run `labor catalog` to list configured series."
                ))
            })
    }

    /// Unit for a stored series id; series outside the catalog display as plain counts.
    pub fn unit_for_id(&self, id: &str) -> Unit {
        self.by_id(id).map(|s| s.unit).unwrap_or(Unit::Count)
    }
}

/// Upstream period code.
///
/// `M01`..`M12` are calendar months, `M13` is the annual average, and any
/// other code (`Q01`, `S01`, `A01`, ...) is a non-monthly aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Month(u32),
    AnnualAverage,
    Other,
}

impl Period {
    pub fn parse(code: &str) -> Self {
        let code = code.trim();
        let Some(digits) = code.strip_prefix('M') else {
            return Period::Other;
        };
        match digits.parse::<u32>() {
            Ok(13) => Period::AnnualAverage,
            Ok(m) if (1..=12).contains(&m) && digits.len() == 2 => Period::Month(m),
            _ => Period::Other,
        }
    }

    pub fn month(self) -> Option<u32> {
        match self {
            Period::Month(m) => Some(m),
            _ => None,
        }
    }

    /// First day of the month for a monthly period; `None` for aggregates.
    pub fn first_of_month(self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month()?, 1)
    }
}

/// One (series, month) data point, as persisted in the store.
///
/// Field order matches the store's column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub series_id: String,
    pub series_name: String,
    pub year: i32,
    pub period: String,
    pub period_name: String,
    pub value: f64,
    pub date: NaiveDate,
}

impl Observation {
    /// Build an observation from upstream fields; `None` for non-monthly periods.
    pub fn monthly(
        series: &SeriesDef,
        year: i32,
        period: &str,
        period_name: &str,
        value: f64,
    ) -> Option<Self> {
        let date = Period::parse(period).first_of_month(year)?;
        Some(Self {
            series_id: series.id.clone(),
            series_name: series.name.clone(),
            year,
            period: period.trim().to_string(),
            period_name: period_name.to_string(),
            value,
            date,
        })
    }

    pub fn key(&self) -> (&str, NaiveDate) {
        (&self.series_id, self.date)
    }
}

/// Inclusive date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::invalid_input(format!(
                "Date range start {start} is after end {end}."
            )));
        }
        Ok(Self { start, end })
    }

    /// Full span of the given rows; `None` when there are no rows.
    pub fn spanning(rows: &[Observation]) -> Option<Self> {
        let start = rows.iter().map(|r| r.date).min()?;
        let end = rows.iter().map(|r| r.date).max()?;
        Some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Clamp a date into the range.
    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.start, self.end)
    }
}

/// Shift a first-of-month date by whole months.
pub fn add_months(date: NaiveDate, delta: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + delta;
    let year = total.div_euclid(12);
    let month0 = total.rem_euclid(12) as u32;
    NaiveDate::from_ymd_opt(year, month0 + 1, 1).unwrap_or(date)
}

/// Parse a user-supplied date: `YYYY-MM-DD` or `YYYY-MM` (first of month).
pub fn parse_date_arg(raw: &str) -> Result<NaiveDate, AppError> {
    let trimmed = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(d);
    }
    NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
        .map_err(|e| AppError::invalid_input(format!("Invalid date '{trimmed}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn period_codes_classify() {
        assert_eq!(Period::parse("M01"), Period::Month(1));
        assert_eq!(Period::parse("M12"), Period::Month(12));
        assert_eq!(Period::parse("M13"), Period::AnnualAverage);
        assert_eq!(Period::parse("Q01"), Period::Other);
        assert_eq!(Period::parse("A01"), Period::Other);
        assert_eq!(Period::parse("M1"), Period::Other);
        assert_eq!(Period::parse("M00"), Period::Other);
    }

    #[test]
    fn monthly_observation_dates_are_first_of_month() {
        let def = SeriesDef::new("LNS14000000", "Unemployment Rate", Unit::Percentage);
        let obs = Observation::monthly(&def, 2024, "M07", "July", 4.3).unwrap();
        assert_eq!(obs.date, d(2024, 7));
        assert!(Observation::monthly(&def, 2024, "M13", "Annual", 4.0).is_none());
    }

    #[test]
    fn catalog_lookup_is_case_insensitive() {
        let catalog = Catalog::new(vec![
            SeriesDef::new("LNS14000000", "Unemployment Rate", Unit::Percentage),
            SeriesDef::new("CES0500000003", "Average Hourly Earnings", Unit::Currency),
        ])
        .unwrap();
        assert_eq!(catalog.by_name("unemployment rate").unwrap().id, "LNS14000000");
        assert_eq!(catalog.resolve("CES0500000003").unwrap().unit, Unit::Currency);
        assert!(catalog.resolve("Nope").is_err());
        assert_eq!(catalog.unit_for_id("CES0500000003"), Unit::Currency);
        assert_eq!(catalog.unit_for_id("XYZ"), Unit::Count);
    }

    #[test]
    fn catalog_rejects_duplicate_ids() {
        let err = Catalog::new(vec![
            SeriesDef::new("X", "A", Unit::Count),
            SeriesDef::new("X", "B", Unit::Count),
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn date_range_rejects_inverted_bounds() {
        assert!(DateRange::new(d(2024, 5), d(2024, 1)).is_err());
        let r = DateRange::new(d(2023, 11), d(2024, 2)).unwrap();
        assert!(r.contains(d(2024, 1)));
        assert!(!r.contains(d(2024, 3)));
    }

    #[test]
    fn add_months_crosses_year_boundaries() {
        assert_eq!(add_months(d(2024, 12), 1), d(2025, 1));
        assert_eq!(add_months(d(2024, 1), -1), d(2023, 12));
        assert_eq!(add_months(d(2024, 3), -15), d(2022, 12));
    }

    #[test]
    fn parse_date_arg_accepts_month_shorthand() {
        assert_eq!(parse_date_arg("2024-03").unwrap(), d(2024, 3));
        assert_eq!(parse_date_arg("2024-03-01").unwrap(), d(2024, 3));
        assert!(parse_date_arg("March").is_err());
    }
}
