//! Presenter data preparation.
//!
//! Turns the loaded store plus a user selection into views that the text
//! reports and the TUI render. Nothing here mutates the store.

pub mod cache;
pub mod filter;
pub mod metrics;
pub mod sectors;

pub use cache::StoreCache;
pub use filter::{Selection, filter_rows, selection_bounds};
pub use metrics::{MetricSummary, SeriesMetrics, compute_metrics, period_change};
pub use sectors::{LatestChange, MonthlyChange, SectorComparison, sector_comparison};

use crate::domain::{Catalog, Observation, SeriesDef, Unit};

/// Everything needed to render one series.
#[derive(Debug, Clone)]
pub struct SeriesView {
    pub series: SeriesDef,
    pub rows: Vec<Observation>,
    pub metrics: SeriesMetrics,
}

impl SeriesView {
    pub fn unit(&self) -> Unit {
        self.series.unit
    }
}

/// Filter `rows` to one catalog series (and optional range) and compute its metrics.
pub fn series_view(rows: &[Observation], series: &SeriesDef, selection: &Selection) -> SeriesView {
    let selection = Selection::single(series.id.as_str()).with_range(selection.range);
    let rows = filter_rows(rows, &selection);
    let metrics = compute_metrics(&rows);
    SeriesView {
        series: series.clone(),
        rows,
        metrics,
    }
}

/// Catalog entries for the configured sector ids, in configured order.
pub fn sector_defs<'a>(catalog: &'a Catalog, ids: &[String]) -> Vec<&'a SeriesDef> {
    ids.iter().filter_map(|id| catalog.by_id(id)).collect()
}
