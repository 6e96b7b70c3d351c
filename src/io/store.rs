//! The persisted observation store.
//!
//! A single CSV file with header
//! `series_id,series_name,year,period,period_name,value,date`, one row per
//! (series, month). The collector rewrites it; everything else only reads it.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::domain::Observation;
use crate::error::AppError;

pub const STORE_COLUMNS: [&str; 7] = [
    "series_id",
    "series_name",
    "year",
    "period",
    "period_name",
    "value",
    "date",
];

/// Read every observation from the store.
pub fn read_store(path: &Path) -> Result<Vec<Observation>, AppError> {
    if !path.exists() {
        return Err(AppError::MissingStore(path.to_path_buf()));
    }
    if path.is_dir() {
        return Err(AppError::store(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }

    let file = File::open(path)
        .map_err(|e| AppError::store(format!("Failed to open '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::store(format!("Failed to read headers of '{}': {e}", path.display())))?
        .clone();
    let missing: Vec<&str> = STORE_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::store(format!(
            "'{}' is missing column(s): {}",
            path.display(),
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<Observation>().enumerate() {
        // +2: records start after the header and lines are 1-based.
        let line = idx + 2;
        let row = result.map_err(|e| {
            AppError::store(format!("{} line {line}: {e}", path.display()))
        })?;
        rows.push(row);
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "read store");
    Ok(rows)
}

/// Replace the store with `rows`, creating the data directory if needed.
///
/// Rows are written to a sibling temp file that is then renamed over the store.
pub fn write_store(path: &Path, rows: &[Observation]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::store(format!("Failed to create data directory '{}': {e}", parent.display()))
        })?;
    }

    let tmp = temp_path(path);
    let file = File::create(&tmp)
        .map_err(|e| AppError::store(format!("Failed to create '{}': {e}", tmp.display())))?;
    if let Err(e) = write_rows(file, rows) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path).map_err(|e| {
        AppError::store(format!("Failed to move '{}' into place: {e}", tmp.display()))
    })?;

    tracing::debug!(path = %path.display(), rows = rows.len(), "wrote store");
    Ok(())
}

/// Serialize observations in store format to any writer.
pub fn write_rows<W: Write>(writer: W, rows: &[Observation]) -> Result<(), AppError> {
    let mut out = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    // Written explicitly so an empty table still carries the schema.
    out.write_record(STORE_COLUMNS)
        .map_err(|e| AppError::store(format!("Failed to write header: {e}")))?;
    for row in rows {
        out.serialize(row)
            .map_err(|e| AppError::store(format!("Failed to write row: {e}")))?;
    }
    out.flush()
        .map_err(|e| AppError::store(format!("Failed to flush rows: {e}")))?;
    Ok(())
}

/// Modification time of the store, if it exists.
pub fn store_mtime(path: &Path) -> Result<SystemTime, AppError> {
    let meta = fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::MissingStore(path.to_path_buf())
        } else {
            AppError::store(format!("Failed to stat '{}': {e}", path.display()))
        }
    })?;
    meta.modified()
        .map_err(|e| AppError::store(format!("No modification time for '{}': {e}", path.display())))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "store.csv".into());
    name.push(".tmp");
    path.with_file_name(name)
}
