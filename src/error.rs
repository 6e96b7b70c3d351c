//! Error type shared by the collector, the store, and the presenter.
//!
//! Every variant maps to a process exit code so `main` can stay tiny.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Upstream API failure: transport, HTTP status, or a malformed envelope.
    #[error("Data source error for {series_id}: {message}")]
    DataSource { series_id: String, message: String },

    /// The persisted store does not exist yet.
    #[error("Data store not found at {}. Run `labor collect` first.", .0.display())]
    MissingStore(PathBuf),

    /// The persisted store exists but could not be read or written.
    #[error("Data store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn data_source(series_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            series_id: series_id.into(),
            message: message.into(),
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::InvalidInput(_) => 2,
            Self::MissingStore(_) => 3,
            Self::DataSource { .. } | Self::Store(_) | Self::Terminal(_) | Self::Io(_) => 4,
        }
    }
}
