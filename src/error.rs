//! Error types for shift-planner.
//!
//! The search itself cannot fail once it has a valid configuration, so the
//! error surface is limited to configuration values, roster loading and
//! report writing.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Roster loading errors
    #[error("Roster error: {0}")]
    Load(#[from] LoadError),

    /// Report writing errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to read or parse a configuration file
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Errors raised while turning a roster file into event records.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record is missing a field the core cannot do without
    #[error("Line {line}: missing {field}")]
    MissingField { line: u64, field: &'static str },

    /// A field is present but cannot be interpreted
    #[error("Line {line}: invalid {field}: {message}")]
    InvalidField {
        line: u64,
        field: &'static str,
        message: String,
    },

    #[error("Unsupported roster format: {0}")]
    UnsupportedFormat(String),
}

/// Errors raised while writing CSV reports.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for PlannerError
pub type Result<T, E = PlannerError> = std::result::Result<T, E>;
