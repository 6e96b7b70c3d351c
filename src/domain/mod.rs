//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the series catalog (`SeriesDef`, `Catalog`, `Unit`)
//! - upstream period codes (`Period`)
//! - persisted observations (`Observation`) and date windows (`DateRange`)

pub mod types;

pub use types::*;
