//! Plain-text charts for CLI output.

pub mod ascii;

pub use ascii::render_trend_plot;
