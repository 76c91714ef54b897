//! Unified error handling for the harvester.
//!
//! Extraction problems are deliberately absent from this taxonomy: the
//! extractor turns them into a `None` result and a diagnostic instead of an
//! error (see [`crate::scrapers::inshorts`]).

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Unified harvester error type.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// The requested category key is not in the registry
    #[error("Unknown category '{key}' (known: {known})")]
    UnknownCategory { key: String, known: String },

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Browser launch, navigation or interaction failed
    #[error("Browser error: {0}")]
    Browser(String),

    /// A selector never appeared within the allowed time
    #[error("Timed out after {waited:?} waiting for '{selector}'")]
    Timeout { selector: String, waited: Duration },

    /// A write would leave a record without a required field
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// SQLite operation failed
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// YAML config parsing failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl HarvestError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a browser error.
    pub fn browser(message: impl fmt::Display) -> Self {
        Self::Browser(message.to_string())
    }
}

impl From<chromiumoxide::error::CdpError> for HarvestError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        Self::browser(e)
    }
}
