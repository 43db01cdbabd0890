//! Domain error types
//!
//! This module defines the error hierarchy for Adload. All errors are
//! domain-specific and don't expose third-party types: store adapters and
//! parsers map their native errors into these variants at the boundary.

use thiserror::Error;

/// Main Adload error type
///
/// This is the primary error type used throughout the application.
/// No variant is caught and recovered inside the load pipeline; every error
/// aborts the running load invocation and surfaces through the CLI.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Configuration-related errors (bad config file, missing loader
    /// dependency in the resolved graph)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input parse errors (audience grammar, actions JSON, malformed field
    /// values). Carries enough context to locate the offending row.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The backing store rejected a write (e.g. a duplicate primary key that
    /// slipped past the in-memory dedup cache). Surfaces the store's native
    /// error text.
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Database-related errors (connection, pool, query failures)
    #[error("Database error: {0}")]
    Database(String),

    /// CSV decoding errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Io(err.to_string())
    }
}

// Conversion from csv::Error
impl From<csv::Error> for LoadError {
    fn from(err: csv::Error) -> Self {
        LoadError::Csv(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for LoadError {
    fn from(err: toml::de::Error) -> Self {
        LoadError::Configuration(format!("TOML parse error: {err}"))
    }
}
