//! Error types for the calmap engine.
//!
//! Bad row data is never an error at this level: the validator reports it as
//! itemized values and the codec serializes whatever it is given. Only
//! caller-input problems (unknown schema key, unreadable mapping artifact)
//! surface here.

use thiserror::Error;

/// Errors that can occur in calmap operations.
#[derive(Error, Debug)]
pub enum CalMapError {
    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    #[error("Mapping artifact error: {0}")]
    Artifact(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for calmap operations.
pub type CalMapResult<T> = Result<T, CalMapError>;
