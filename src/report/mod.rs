//! Reporting utilities: value formatting and plain-text tables.

pub mod format;

pub use format::*;
