//! `labor-dash` library crate.
//!
//! The binary (`labor`) is a thin wrapper around this library so that:
//!
//! - the collector and presenter are testable without spawning processes
//! - the network client sits behind a trait and can be swapped in tests
//! - code stays easy to navigate as the project grows
//!
//! Data flows one way: `data` fetches observations, `collect` merges them into
//! the CSV store (`io`), and `present` turns the store into views for the
//! `report`/`plot` text output and the `tui` dashboard.

pub mod app;
pub mod cli;
pub mod collect;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod present;
pub mod report;
pub mod tui;
