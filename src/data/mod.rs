//! Upstream data sources.

pub mod bls;

pub use bls::BlsClient;

use crate::domain::{Observation, SeriesDef};
use crate::error::AppError;

/// Something that can produce monthly observations for one series.
///
/// The collector only talks to this trait, so runs can be driven by the live
/// BLS client or by an in-memory source.
pub trait SeriesSource {
    /// Fetch `series` for the inclusive year range. Non-monthly periods must
    /// already be dropped.
    fn fetch(&self, series: &SeriesDef, start_year: i32, end_year: i32) -> Result<Vec<Observation>, AppError>;
}
