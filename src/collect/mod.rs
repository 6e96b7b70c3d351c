//! Collection run: fetch the catalog, merge into the store, write it back.
//!
//! Series are fetched one at a time, in catalog order. There are no retries;
//! a failed series is either skipped or aborts the run, per `FailurePolicy`.

use std::path::{Path, PathBuf};

use chrono::Datelike;

use crate::config::{CollectorConfig, FailurePolicy};
use crate::data::SeriesSource;
use crate::domain::{Catalog, Observation};
use crate::error::AppError;
use crate::io::store::{read_store, write_store};

pub mod merge;

pub use merge::{merge_observations, relabel_rows, sort_for_store};

/// Resolved parameters of one collection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectOptions {
    pub start_year: i32,
    pub end_year: i32,
    pub failure_policy: FailurePolicy,
}

impl CollectOptions {
    /// Resolve config values; a missing end year means the current year.
    pub fn from_config(config: &CollectorConfig) -> Self {
        Self {
            start_year: config.start_year,
            end_year: config.end_year.unwrap_or_else(|| chrono::Local::now().year()),
            failure_policy: config.failure_policy,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.start_year > self.end_year {
            return Err(AppError::config(format!(
                "Start year {} is after end year {}.",
                self.start_year, self.end_year
            )));
        }
        Ok(())
    }
}

/// Per-series outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesOutcome {
    pub series_id: String,
    pub series_name: String,
    /// Monthly rows fetched, or the failure message.
    pub result: std::result::Result<usize, String>,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct CollectReport {
    pub store_path: PathBuf,
    pub outcomes: Vec<SeriesOutcome>,
    pub rows_fetched: usize,
    pub rows_before: usize,
    pub rows_after: usize,
}

impl CollectReport {
    pub fn failures(&self) -> impl Iterator<Item = &SeriesOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }
}

/// Fetch every catalog series and merge the batch into the store at `store_path`.
pub fn collect(
    catalog: &Catalog,
    source: &dyn SeriesSource,
    options: &CollectOptions,
    store_path: &Path,
) -> Result<CollectReport, AppError> {
    options.validate()?;

    let mut batch: Vec<Observation> = Vec::new();
    let mut outcomes = Vec::with_capacity(catalog.len());

    for series in catalog.iter() {
        tracing::info!(series = %series.id, name = %series.name, "fetching");
        match source.fetch(series, options.start_year, options.end_year) {
            Ok(rows) => {
                tracing::debug!(series = %series.id, rows = rows.len(), "fetched");
                outcomes.push(SeriesOutcome {
                    series_id: series.id.clone(),
                    series_name: series.name.clone(),
                    result: Ok(rows.len()),
                });
                batch.extend(rows);
            }
            Err(err) => match options.failure_policy {
                FailurePolicy::Abort => {
                    tracing::error!(series = %series.id, error = %err, "aborting collection");
                    return Err(err);
                }
                FailurePolicy::Skip => {
                    tracing::warn!(series = %series.id, error = %err, "skipping series");
                    outcomes.push(SeriesOutcome {
                        series_id: series.id.clone(),
                        series_name: series.name.clone(),
                        result: Err(err.to_string()),
                    });
                }
            },
        }
    }

    if !outcomes.iter().any(|o| o.result.is_ok()) {
        return Err(AppError::data_source(
            "all series",
            "no series could be fetched; the store was left unchanged",
        ));
    }

    let mut existing = match read_store(store_path) {
        Ok(rows) => rows,
        Err(AppError::MissingStore(_)) => Vec::new(),
        Err(err) => return Err(err),
    };

    let renamed = relabel_rows(&mut existing, catalog);
    if renamed > 0 {
        tracing::info!(rows = renamed, "renamed stored rows to current catalog names");
    }

    let rows_before = existing.len();
    let rows_fetched = batch.len();
    let merged = merge_observations(existing, batch);
    let rows_after = merged.len();

    write_store(store_path, &merged)?;
    tracing::info!(
        path = %store_path.display(),
        rows_before,
        rows_fetched,
        rows_after,
        "store updated"
    );

    Ok(CollectReport {
        store_path: store_path.to_path_buf(),
        outcomes,
        rows_fetched,
        rows_before,
        rows_after,
    })
}
