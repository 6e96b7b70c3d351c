//! Shared plumbing used by both the CLI commands and the TUI.
//!
//! Keeping this in one place avoids duplicating the setup steps:
//! settings -> overrides -> store load -> selection
//!
//! The front-ends can then focus on presentation (printing vs widgets).

use crate::cli::{CollectArgs, GlobalArgs, RangeArgs};
use crate::config::{FailurePolicy, Settings};
use crate::collect::CollectOptions;
use crate::domain::{DateRange, Observation, parse_date_arg};
use crate::error::AppError;

/// Load settings and apply global CLI overrides.
pub fn load_settings(global: &GlobalArgs) -> Result<Settings, AppError> {
    let mut settings = Settings::load(global.config.as_deref())?;
    if let Some(dir) = &global.data_dir {
        settings = settings.with_data_dir(dir.clone());
    }
    Ok(settings)
}

/// Resolve the collection parameters from settings plus `collect` flags.
pub fn collect_options(settings: &Settings, args: &CollectArgs) -> CollectOptions {
    let mut config = settings.collector.clone();
    if let Some(start) = args.start_year {
        config.start_year = start;
    }
    if args.end_year.is_some() {
        config.end_year = args.end_year;
    }
    if args.fail_fast {
        config.failure_policy = FailurePolicy::Abort;
    }
    CollectOptions::from_config(&config)
}

/// Load every row of the configured store.
pub fn load_store(settings: &Settings) -> Result<Vec<Observation>, AppError> {
    crate::io::store::read_store(&settings.store_path())
}

/// Turn `--from/--to` into an inclusive range.
///
/// A missing bound defaults to `span` (the data being viewed); no bounds at
/// all means "full span" (`None`).
pub fn resolve_range(span: Option<DateRange>, args: &RangeArgs) -> Result<Option<DateRange>, AppError> {
    let from = args.from.as_deref().map(parse_date_arg).transpose()?;
    let to = args.to.as_deref().map(parse_date_arg).transpose()?;

    let (start, end) = match (from, to, span) {
        (None, None, _) => return Ok(None),
        (Some(f), Some(t), _) => (f, t),
        (Some(f), None, Some(s)) => (f, s.end.max(f)),
        (None, Some(t), Some(s)) => (s.start.min(t), t),
        (Some(f), None, None) => (f, f),
        (None, Some(t), None) => (t, t),
    };
    DateRange::new(start, end).map(Some)
}
