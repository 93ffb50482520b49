//! Error types for autotune-reviewer
//!
//! Failures are split by how the pipeline reacts to them:
//! - [`ExtractError`] skips a record and leaves it pending
//! - [`GenerationError`] is absorbed by the fallback bundle and never escapes the generator
//! - [`Error`] (dataset, artifact, I/O) aborts the run before any commit

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for autotune-reviewer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for autotune-reviewer
///
/// Every variant that reaches the orchestrator halts the run.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "dataset.id_column")
        key: Option<String>,
    },

    /// Dataset could not be read or rewritten
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Output artifact could not be written
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a configuration error for a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Dataset (CSV) errors
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A required column is missing from the header row
    #[error("column '{column}' not found in header of {path}")]
    MissingColumn {
        /// The configured column label that was not found
        column: String,
        /// The dataset file
        path: PathBuf,
    },

    /// The file is not parseable as CSV
    #[error("malformed dataset {path}: {reason}")]
    Malformed {
        /// The dataset file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// A data row carries more cells than the header declares
    #[error("row {line} has {found} fields, header declares {expected}")]
    RowTooLong {
        /// 1-based line number of the offending row
        line: u64,
        /// Number of header columns
        expected: usize,
        /// Number of cells found on the row
        found: usize,
    },
}

/// Artifact write errors
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Output directory could not be created
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        /// The directory that could not be created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Artifact file could not be written
    #[error("failed to write {path}: {source}")]
    Write {
        /// The file that could not be written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Track extraction failure
///
/// Only raised when no track identifier can be derived from the URL. Page fetch
/// problems never surface here; they degrade to placeholder metadata instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The URL has no `track/<id>` segment
    #[error("no track identifier in {url}")]
    NoTrackId {
        /// The URL that was inspected
        url: String,
    },
}

/// Reasons the generation service could not produce a bundle
///
/// Carried as the fallback reason; never returned to callers of
/// [`ContentGenerator::generate`](crate::generator::ContentGenerator::generate).
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No API key configured
    #[error("API key not configured")]
    MissingCredential,

    /// Request could not be sent or the body could not be read
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (may be empty)
        body: String,
    },

    /// Response carried no assistant message
    #[error("response contained no message content")]
    EmptyResponse,

    /// Message content was not the expected JSON object
    #[error("malformed content payload: {reason}")]
    MalformedPayload {
        /// Parser message
        reason: String,
    },
}
