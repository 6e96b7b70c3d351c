//! Command-line parsing for the labor-market collector and dashboard.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! collection and data-prep code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "labor", version, about = "U.S. labor market data collector and dashboard (BLS-based)")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (TOML). Defaults to the platform config directory.
    #[arg(long, global = true, env = "LABOR_DASH_CONFIG", value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Directory holding the data store (overrides `paths.data_dir`; default is
    /// the platform data directory, not the working directory).
    #[arg(long, global = true, env = "LABOR_DASH_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the series catalog from the BLS API and merge it into the store.
    Collect(CollectArgs),
    /// Print latest value and period-over-period change for one series.
    Show(ShowArgs),
    /// Compare the latest month-over-month change across sector series.
    Sectors(SectorsArgs),
    /// Write a filtered selection of the store to CSV.
    Export(ExportArgs),
    /// List the configured series catalog.
    Catalog,
    /// Launch the interactive dashboard.
    Dash,
}

/// Options for a collection run.
#[derive(Debug, Args, Clone, Default)]
pub struct CollectArgs {
    /// First year to request (overrides `collector.start_year`).
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Last year to request (defaults to the current year).
    #[arg(long)]
    pub end_year: Option<i32>,

    /// Abort the run at the first series that fails instead of skipping it.
    #[arg(long)]
    pub fail_fast: bool,
}

/// Inclusive date window shared by the read-side commands.
#[derive(Debug, Args, Clone, Default)]
pub struct RangeArgs {
    /// First month to include (YYYY-MM or YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// Last month to include (YYYY-MM or YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,
}

/// Options for `labor show`.
#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Series name or id. Prompts from the catalog when omitted.
    #[arg(short = 's', long)]
    pub series: Option<String>,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Render an ASCII trend plot.
    #[arg(long)]
    pub plot: bool,

    /// Print the filtered rows.
    #[arg(long)]
    pub raw: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,
}

/// Options for `labor sectors`.
#[derive(Debug, Args, Clone, Default)]
pub struct SectorsArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Write the per-series month-over-month history to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

/// Options for `labor export`.
#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Series names or ids (repeatable). All catalog series when omitted.
    #[arg(short = 's', long = "series")]
    pub series: Vec<String>,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_with_range() {
        let cli = Cli::parse_from([
            "labor", "show", "-s", "Unemployment Rate", "--from", "2023-01", "--plot",
        ]);
        match cli.command {
            Command::Show(args) => {
                assert_eq!(args.series.as_deref(), Some("Unemployment Rate"));
                assert_eq!(args.range.from.as_deref(), Some("2023-01"));
                assert!(args.plot);
                assert!(!args.raw);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["labor", "collect", "--data-dir", "/tmp/x", "--fail-fast"]);
        assert_eq!(cli.global.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(cli.command, Command::Collect(CollectArgs { fail_fast: true, .. })));
    }

    #[test]
    fn export_accepts_repeated_series() {
        let cli = Cli::parse_from(["labor", "export", "-s", "A", "-s", "B", "-o", "out.csv"]);
        match cli.command {
            Command::Export(args) => assert_eq!(args.series, vec!["A", "B"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
