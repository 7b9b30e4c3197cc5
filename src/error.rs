//! Error types for cortex secondary features

use thiserror::Error;

/// Errors that can occur while computing a secondary feature
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid window: start={start}, end={end}, bin_width={bin_width}")]
    InvalidWindow { start: i64, end: i64, bin_width: i64 },

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Feature already registered: {0}")]
    DuplicateFeature(String),

    #[error("Process-wide feature registry is already initialized")]
    RegistryInitialized,

    #[error("Raw data source error: {0}")]
    Source(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid raw record: {0}")]
    InvalidRecord(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
