//! Error handling for station loading, classification and rendering.
//!
//! Provides error types with context for input validation, lookup-table
//! configuration and output failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChargeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Input file not found at path: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Required column '{column}' missing from input file: {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Invalid input file: {path} - {reason}")]
    InvalidInput { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid network tables in {path}: {reason}")]
    InvalidNetworkTables { path: PathBuf, reason: String },

    #[error("Failed to write output: {path} - {reason}")]
    OutputFailed { path: PathBuf, reason: String },

    #[error("Processing interrupted: {reason}")]
    Interrupted { reason: String },
}

impl ChargeError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a missing required column error
    pub fn missing_column(path: impl Into<PathBuf>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            path: path.into(),
            column: column.into(),
        }
    }

    /// Create an output failure error
    pub fn output_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::OutputFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChargeError>;
