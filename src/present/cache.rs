//! In-memory copy of the store, reloaded when the file changes.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::domain::Observation;
use crate::error::AppError;
use crate::io::store::{read_store, store_mtime};

/// Memoizes the store contents keyed by the file's modification time.
#[derive(Debug)]
pub struct StoreCache {
    path: PathBuf,
    loaded: Option<Loaded>,
    loads: usize,
}

#[derive(Debug)]
struct Loaded {
    mtime: SystemTime,
    rows: Vec<Observation>,
}

impl StoreCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: None,
            loads: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current rows, re-reading the file when its mtime differs from the cached one.
    pub fn rows(&mut self) -> Result<&[Observation], AppError> {
        let mtime = store_mtime(&self.path)?;
        let fresh = self.loaded.as_ref().is_some_and(|l| l.mtime == mtime);
        if !fresh {
            let rows = read_store(&self.path)?;
            tracing::debug!(path = %self.path.display(), rows = rows.len(), "store cache refreshed");
            self.loaded = Some(Loaded { mtime, rows });
            self.loads += 1;
        }
        Ok(self.loaded.as_ref().map(|l| l.rows.as_slice()).unwrap_or(&[]))
    }

    /// Drop the cached rows; the next `rows()` call reads the file again.
    pub fn invalidate(&mut self) {
        self.loaded = None;
    }

    /// How many times the file has been read.
    pub fn load_count(&self) -> usize {
        self.loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::write_store;
    use chrono::NaiveDate;
    use std::fs::File;
    use std::time::Duration;

    fn obs(value: f64) -> Observation {
        Observation {
            series_id: "S".to_string(),
            series_name: "Series".to_string(),
            year: 2024,
            period: "M01".to_string(),
            period_name: "January".to_string(),
            value,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    fn bump_mtime(path: &Path, secs: u64) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(secs)).unwrap();
    }

    #[test]
    fn reuses_rows_until_mtime_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.csv");
        write_store(&path, &[obs(1.0)]).unwrap();

        let mut cache = StoreCache::new(&path);
        assert_eq!(cache.rows().unwrap()[0].value, 1.0);
        assert_eq!(cache.rows().unwrap()[0].value, 1.0);
        assert_eq!(cache.load_count(), 1);

        write_store(&path, &[obs(2.0)]).unwrap();
        bump_mtime(&path, 60);
        assert_eq!(cache.rows().unwrap()[0].value, 2.0);
        assert_eq!(cache.load_count(), 2);
    }

    #[test]
    fn invalidate_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.csv");
        write_store(&path, &[obs(1.0)]).unwrap();

        let mut cache = StoreCache::new(&path);
        cache.rows().unwrap();
        cache.invalidate();
        cache.rows().unwrap();
        assert_eq!(cache.load_count(), 2);
    }

    #[test]
    fn missing_file_is_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = StoreCache::new(dir.path().join("absent.csv"));
        assert!(matches!(cache.rows(), Err(AppError::MissingStore(_))));
    }
}
