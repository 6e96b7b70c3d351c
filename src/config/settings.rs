//! Runtime settings shared by the collector and the presenter.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{Catalog, SeriesDef, Unit};
use crate::error::AppError;

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathsConfig,
    pub collector: CollectorConfig,
    pub dashboard: DashboardConfig,
    /// Series catalog, in display order.
    #[serde(rename = "series")]
    pub catalog: Vec<SeriesDef>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            collector: CollectorConfig::default(),
            dashboard: DashboardConfig::default(),
            catalog: default_catalog(),
        }
    }
}

impl Settings {
    /// Load settings from an explicit path or the default config location.
    ///
    /// A missing file at the default location yields the built-in defaults; a
    /// missing file at an explicit path is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let (config_path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (
                super::config_dir()
                    .map(|p| p.join("config.toml"))
                    .unwrap_or_else(|_| PathBuf::from("config.toml")),
                false,
            ),
        };

        if !config_path.exists() {
            if explicit {
                return Err(AppError::config(format!(
                    "Config file not found: {}",
                    config_path.display()
                )));
            }
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let settings = Self::from_toml(&content).map_err(|e| match e {
            AppError::Config(msg) => {
                AppError::config(format!("{}: {msg}", config_path.display()))
            }
            other => other,
        })?;
        tracing::debug!(path = %config_path.display(), "loaded config");
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self, AppError> {
        let settings: Self = toml::from_str(content).map_err(|e| AppError::config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String, AppError> {
        toml::to_string_pretty(self).map_err(|e| AppError::config(e.to_string()))
    }

    /// Settings rooted at an explicit data directory (tests, `--data-dir`).
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.paths.data_dir = data_dir.into();
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.catalog()?;
        if self.paths.store_file.trim().is_empty() {
            return Err(AppError::config("paths.store_file must not be empty."));
        }
        if let Some(end) = self.collector.end_year {
            if end < self.collector.start_year {
                return Err(AppError::config(format!(
                    "collector.end_year ({end}) is before collector.start_year ({}).",
                    self.collector.start_year
                )));
            }
        }
        for id in &self.dashboard.sector_series {
            if !self.catalog.iter().any(|s| &s.id == id) {
                return Err(AppError::config(format!(
                    "dashboard.sector_series references unknown series id {id}."
                )));
            }
        }
        Ok(())
    }

    pub fn catalog(&self) -> Result<Catalog, AppError> {
        if self.catalog.is_empty() {
            return Err(AppError::config("The series catalog is empty."));
        }
        Catalog::new(self.catalog.clone())
    }

    /// Full path of the persisted store.
    pub fn store_path(&self) -> PathBuf {
        self.paths.data_dir.join(&self.paths.store_file)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.paths.data_dir.join("logs")
    }
}

/// Filesystem locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the store (created on first collection). Defaults to
    /// the platform data directory, e.g. `~/.local/share/labor-dash` on Linux.
    pub data_dir: PathBuf,
    /// Store file name inside `data_dir`.
    pub store_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: super::default_data_dir(),
            store_file: "bls_labor_data.csv".to_string(),
        }
    }
}

/// What a collection run does when one series cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log a warning, record the failure, and continue with the next series.
    Skip,
    /// Stop at the first failure without touching the store.
    Abort,
}

/// Collector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Base URL; the series id is appended as a path segment.
    pub base_url: String,
    pub start_year: i32,
    /// Defaults to the current year when unset.
    pub end_year: Option<i32>,
    pub failure_policy: FailurePolicy,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.bls.gov/publicAPI/v2/timeseries/data".to_string(),
            start_year: 2019,
            end_year: None,
            failure_policy: FailurePolicy::Skip,
        }
    }
}

/// Dashboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Event poll interval in milliseconds.
    pub tick_rate_ms: u64,
    /// Series ids shown in the sector comparison view.
    pub sector_series: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 100,
            sector_series: vec![
                "CES0000000001".to_string(),
                "CES3000000001".to_string(),
                "CES7000000001".to_string(),
            ],
        }
    }
}

pub fn default_catalog() -> Vec<SeriesDef> {
    vec![
        SeriesDef::new("CES0000000001", "Total Nonfarm Employment", Unit::Count),
        SeriesDef::new("LNS14000000", "Unemployment Rate", Unit::Percentage),
        SeriesDef::new("CES0500000003", "Average Hourly Earnings", Unit::Currency),
        SeriesDef::new("LNS11300000", "Labor Force Participation Rate", Unit::Percentage),
        SeriesDef::new("CES3000000001", "Manufacturing Employment", Unit::Count),
        SeriesDef::new("CES7000000001", "Leisure & Hospitality Employment", Unit::Count),
    ]
}
