//! Configuration management.
//!
//! Settings come from a TOML file (default: the platform config directory),
//! with CLI flags applied on top by `app`.

mod settings;

pub use settings::{
    CollectorConfig, DashboardConfig, FailurePolicy, PathsConfig, Settings, default_catalog,
};

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::AppError;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "labor-dash", "labor-dash")
}

/// Get the configuration directory path.
pub fn config_dir() -> Result<PathBuf, AppError> {
    project_dirs()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| AppError::config("Could not determine config directory"))
}

/// Default home of the store: the platform data directory, so every working
/// directory sees the same store. Falls back to `./data` when the platform
/// has no home directory.
pub fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_does_not_depend_on_working_directory() {
        let dir = default_data_dir();
        if project_dirs().is_some() {
            assert!(dir.is_absolute(), "{}", dir.display());
        }
        assert_eq!(Settings::default().paths.data_dir, dir);
    }
}
