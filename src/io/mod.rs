//! Input/output helpers.
//!
//! - the persisted observation store (`store`)
//! - CSV exports of derived views (`export`)

pub mod export;
pub mod store;

pub use export::*;
pub use store::*;
