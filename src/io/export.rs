//! Export derived views to CSV.
//!
//! Exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::{self, File};
use std::path::Path;

use crate::error::AppError;
use crate::present::MonthlyChange;

/// Write a filtered selection in store format.
pub fn write_selection_csv(path: &Path, rows: &[crate::domain::Observation]) -> Result<(), AppError> {
    let file = create(path)?;
    crate::io::store::write_rows(file, rows)
}

/// Write per-series month-over-month history (sector comparison view).
///
/// The first row of each series has no change and leaves that column blank.
pub fn write_changes_csv(path: &Path, history: &[MonthlyChange]) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(create(path)?);

    out.write_record(["series_id", "series_name", "date", "value", "change"])
        .map_err(|e| AppError::store(format!("Failed to write export CSV header: {e}")))?;

    for row in history {
        let date = row.date.to_string();
        let value = row.value.to_string();
        let change = row.change.map(|c| format!("{c:.4}")).unwrap_or_default();
        out.write_record([
            row.series_id.as_str(),
            row.series_name.as_str(),
            date.as_str(),
            value.as_str(),
            change.as_str(),
        ])
        .map_err(|e| AppError::store(format!("Failed to write export CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::store(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

fn create(path: &Path) -> Result<File, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
        .map_err(|e| AppError::store(format!("Failed to create export CSV '{}': {e}", path.display())))
}
