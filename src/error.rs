//! Error types for feature extraction runs.
//!
//! This module provides the [`MinerError`] type for all library operations
//! and the [`Result`] convenience type.
//!
//! Only selector compilation and I/O-level failures surface as errors. Per-record
//! anomalies (a missing `001`, a selector that matches nothing, an indicator filter
//! the field cannot satisfy) degrade to empty values instead.

use thiserror::Error;

/// Error type for all marc-miner operations.
#[derive(Error, Debug)]
pub enum MinerError {
    /// A selector token could not be compiled.
    ///
    /// Raised at startup, before any record is read.
    #[error("Malformed selector '{token}': {reason}")]
    MalformedSelector {
        /// The cleaned token as supplied by the caller
        token: String,
        /// What the parser rejected
        reason: String,
    },

    /// Error while tokenizing record markup.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error raised by the CSV row writer.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error raised by the JSON Lines row writer.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl MinerError {
    /// Build a [`MinerError::MalformedSelector`] for `token`.
    pub(crate) fn malformed(token: &str, reason: impl Into<String>) -> Self {
        MinerError::MalformedSelector {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for [`std::result::Result`] with [`MinerError`].
pub type Result<T> = std::result::Result<T, MinerError>;
