//! Merge policy for the persisted store.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{Catalog, Observation};

/// Union `existing` with `batch`, keeping one row per `(series_id, date)`.
///
/// On conflict the row from `batch` wins (later rows in `batch` win over
/// earlier ones). Output is ordered by series name, then date, then series id.
pub fn merge_observations(existing: Vec<Observation>, batch: Vec<Observation>) -> Vec<Observation> {
    let mut by_key: HashMap<(String, NaiveDate), Observation> =
        HashMap::with_capacity(existing.len() + batch.len());

    for row in existing.into_iter().chain(batch) {
        by_key.insert((row.series_id.clone(), row.date), row);
    }

    let mut merged: Vec<Observation> = by_key.into_values().collect();
    sort_for_store(&mut merged);
    merged
}

/// Rename stored rows to the catalog's current name for their id.
///
/// Keeps `series_name` consistent per id after a series is renamed in the
/// catalog. Rows for ids outside the catalog keep their stored name.
/// Returns the number of rows renamed.
pub fn relabel_rows(rows: &mut [Observation], catalog: &Catalog) -> usize {
    let mut renamed = 0;
    for row in rows.iter_mut() {
        let Some(def) = catalog.by_id(&row.series_id) else {
            continue;
        };
        if row.series_name != def.name {
            row.series_name.clone_from(&def.name);
            renamed += 1;
        }
    }
    renamed
}

/// Canonical store order: series name, then date, then series id.
pub fn sort_for_store(rows: &mut [Observation]) {
    rows.sort_by(|a, b| {
        a.series_name
            .cmp(&b.series_name)
            .then(a.date.cmp(&b.date))
            .then_with(|| a.series_id.cmp(&b.series_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SeriesDef, Unit};
    use std::collections::HashSet;

    fn obs(id: &str, name: &str, m: u32, value: f64) -> Observation {
        Observation {
            series_id: id.to_string(),
            series_name: name.to_string(),
            year: 2024,
            period: format!("M{m:02}"),
            period_name: "Month".to_string(),
            value,
            date: NaiveDate::from_ymd_opt(2024, m, 1).unwrap(),
        }
    }

    #[test]
    fn newest_batch_wins_on_duplicate_keys() {
        let old = vec![
            obs("LNS14000000", "Unemployment Rate", 1, 3.7),
            obs("LNS14000000", "Unemployment Rate", 2, 3.8),
        ];
        let new = vec![
            obs("LNS14000000", "Unemployment Rate", 2, 3.9),
            obs("LNS14000000", "Unemployment Rate", 3, 3.8),
        ];
        let merged = merge_observations(old, new);

        assert_eq!(merged.len(), 3);
        let feb = merged
            .iter()
            .find(|r| r.date == NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
            .unwrap();
        assert!((feb.value - 3.9).abs() < 1e-12);
    }

    #[test]
    fn merged_keys_are_unique() {
        let old = (1..=6).map(|m| obs("A", "Alpha", m, m as f64)).collect();
        let new = (4..=9).map(|m| obs("A", "Alpha", m, 10.0 * m as f64)).collect();
        let merged = merge_observations(old, new);

        let keys: HashSet<_> = merged.iter().map(|r| (r.series_id.clone(), r.date)).collect();
        assert_eq!(keys.len(), merged.len());
        assert_eq!(merged.len(), 9);
        for r in &merged {
            let m = r.period[1..].parse::<f64>().unwrap();
            let expected = if m >= 4.0 { 10.0 * m } else { m };
            assert!((r.value - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn output_is_sorted_by_name_then_date() {
        let old = vec![obs("Z", "Zulu", 2, 1.0), obs("A", "Alpha", 3, 1.0)];
        let new = vec![obs("A", "Alpha", 1, 1.0), obs("Z", "Zulu", 1, 1.0)];
        let merged = merge_observations(old, new);
        let order: Vec<(&str, u32)> = merged
            .iter()
            .map(|r| (r.series_name.as_str(), r.date.format("%m").to_string().parse().unwrap()))
            .collect();
        assert_eq!(order, vec![("Alpha", 1), ("Alpha", 3), ("Zulu", 1), ("Zulu", 2)]);
    }

    #[test]
    fn merge_into_empty_store() {
        let merged = merge_observations(Vec::new(), vec![obs("A", "Alpha", 1, 1.0)]);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn relabel_follows_catalog_names() {
        let catalog = Catalog::new(vec![SeriesDef::new("A", "Alpha Prime", Unit::Count)]).unwrap();
        let mut rows = vec![obs("A", "Alpha", 1, 1.0), obs("A", "Alpha Prime", 2, 2.0), obs("Z", "Zulu", 1, 1.0)];

        assert_eq!(relabel_rows(&mut rows, &catalog), 1);
        let names: Vec<&str> = rows.iter().map(|r| r.series_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha Prime", "Alpha Prime", "Zulu"]);
    }
}
