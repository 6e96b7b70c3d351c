//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads settings
//! - sets up logging
//! - runs the collector or one of the presenter front-ends

use clap::Parser;

use crate::cli::{Command, ExportArgs, SectorsArgs, ShowArgs};
use crate::config::Settings;
use crate::data::BlsClient;
use crate::domain::DateRange;
use crate::error::AppError;
use crate::present::{Selection, filter_rows, sector_comparison, sector_defs, selection_bounds, series_view};

pub mod pipeline;

/// Entry point for the `labor` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` may provide values for env-backed flags, so load it before parsing.
    dotenvy::dotenv().ok();

    // We want `labor` and `labor --data-dir X` to behave like `labor dash ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    if let Command::Dash = cli.command {
        let settings = pipeline::load_settings(&cli.global)?;
        let _guard = crate::logging::init_file(&settings.log_dir())?;
        return crate::tui::run(settings);
    }

    crate::logging::init_stderr();
    let settings = pipeline::load_settings(&cli.global)?;

    match cli.command {
        Command::Collect(args) => handle_collect(&settings, &args),
        Command::Show(args) => handle_show(&settings, &args),
        Command::Sectors(args) => handle_sectors(&settings, &args),
        Command::Export(args) => handle_export(&settings, &args),
        Command::Catalog => handle_catalog(&settings),
        Command::Dash => Ok(()),
    }
}

fn handle_collect(settings: &Settings, args: &crate::cli::CollectArgs) -> Result<(), AppError> {
    let catalog = settings.catalog()?;
    let options = pipeline::collect_options(settings, args);
    let client = BlsClient::new(&settings.collector)?;

    let report = crate::collect::collect(&catalog, &client, &options, &settings.store_path())?;
    print!("{}", crate::report::format_collect_report(&report));
    Ok(())
}

fn handle_show(settings: &Settings, args: &ShowArgs) -> Result<(), AppError> {
    let catalog = settings.catalog()?;
    let rows = pipeline::load_store(settings)?;

    let series = match &args.series {
        Some(reference) => catalog.resolve(reference)?.clone(),
        None => crate::cli::picker::prompt_for_series(&catalog)?,
    };
    let span = selection_bounds(&rows, &Selection::single(series.id.as_str()));
    let range = pipeline::resolve_range(span, &args.range)?;
    let view = series_view(&rows, &series, &Selection::default().with_range(range));

    print!("{}", crate::report::format_series_summary(&view, range));

    if args.plot && !view.rows.is_empty() {
        println!();
        print!(
            "{}",
            crate::plot::render_trend_plot(&view.rows, view.unit(), args.width, args.height)
        );
    }
    if args.raw && !view.rows.is_empty() {
        println!();
        print!("{}", crate::report::format_rows_table(&view.rows, &catalog));
    }

    Ok(())
}

fn handle_sectors(settings: &Settings, args: &SectorsArgs) -> Result<(), AppError> {
    let catalog = settings.catalog()?;
    let rows = pipeline::load_store(settings)?;
    let range = pipeline::resolve_range(DateRange::spanning(&rows), &args.range)?;

    let sectors = sector_defs(&catalog, &settings.dashboard.sector_series);
    let comparison = sector_comparison(&rows, &sectors, range);

    print!("{}", crate::report::format_sector_table(&comparison.latest, &catalog));

    if let Some(path) = &args.export {
        crate::io::export::write_changes_csv(path, &comparison.history)?;
        println!("Wrote {} rows to {}", comparison.history.len(), path.display());
    }
    Ok(())
}

fn handle_export(settings: &Settings, args: &ExportArgs) -> Result<(), AppError> {
    let catalog = settings.catalog()?;
    let rows = pipeline::load_store(settings)?;
    let range = pipeline::resolve_range(DateRange::spanning(&rows), &args.range)?;

    let selection = if args.series.is_empty() {
        Selection::many(catalog.iter().map(|s| s.id.as_str()))
    } else {
        Selection::resolve(&catalog, &args.series)?
    };

    let selected = filter_rows(&rows, &selection.with_range(range));
    if selected.is_empty() {
        tracing::warn!("no data for the selected range; writing header only");
    }
    crate::io::export::write_selection_csv(&args.out, &selected)?;
    println!("Wrote {} rows to {}", selected.len(), args.out.display());
    Ok(())
}

fn handle_catalog(settings: &Settings) -> Result<(), AppError> {
    let catalog = settings.catalog()?;
    print!("{}", crate::report::format_catalog(&catalog));
    println!("Store: {}", settings.store_path().display());
    Ok(())
}

/// Rewrite argv so `labor` defaults to `labor dash`.
///
/// Rules:
/// - `labor`                      -> `labor dash`
/// - `labor --data-dir X ...`     -> `labor dash --data-dir X ...`
/// - `labor --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("dash".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "collect" | "show" | "sectors" | "export" | "catalog" | "dash"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "dash flags".
    if arg1.starts_with('-') {
        argv.insert(1, "dash".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
