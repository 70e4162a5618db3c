// src/error.rs
//! Unified error handling for the EMG signal engine
//!
//! Every fallible operation in the crate returns [`EmgResult`]. Errors are raised
//! synchronously to the direct caller; nothing in the engine retries on its own.

use thiserror::Error;

/// Result alias used throughout the crate
pub type EmgResult<T> = Result<T, EmgError>;

/// Unified error type for acquisition, processing and storage
#[derive(Debug, Error)]
pub enum EmgError {
    /// `apply_all` was called with an empty filter queue
    #[error("no filters scheduled")]
    NoFiltersScheduled,

    /// The table must be materialized by at least one read before it is processed
    #[error("signal table is not up to date: read the signal before {operation}")]
    StaleReadRequired {
        /// Operation that was refused
        operation: &'static str,
    },

    /// A delivered row does not match the configured channel count
    #[error("row shape mismatch: expected {expected} channels, got {actual}")]
    RowShape {
        /// Configured channel count
        expected: usize,
        /// Length of the rejected row
        actual: usize,
    },

    /// The sample queue hit its configured hard bound
    #[error("sample queue is full (capacity {capacity})")]
    Capacity {
        /// Configured queue capacity
        capacity: usize,
    },

    /// No dataset with this id exists in the store
    #[error("dataset {id} does not exist")]
    DatasetNotFound {
        /// Requested dataset id
        id: String,
    },

    /// The dataset exists but has no metadata sidecar
    #[error("metadata for dataset {id} does not exist")]
    MetadataNotFound {
        /// Requested dataset id
        id: String,
    },

    /// A filter stage failed
    #[error("filter '{filter}' failed: {reason}")]
    Filter {
        /// Name of the failing filter
        filter: String,
        /// Failure description
        reason: String,
    },

    /// A feature extractor failed
    #[error("feature extractor '{extractor}' failed: {reason}")]
    Extraction {
        /// Name of the failing extractor
        extractor: String,
        /// Failure description
        reason: String,
    },

    /// Rows or arrays could not form a rectangular table
    #[error("invalid table: {reason}")]
    InvalidTable {
        /// Failure description
        reason: String,
    },

    /// Invalid engine configuration
    #[error("configuration error: {reason}")]
    Configuration {
        /// Failure description
        reason: String,
    },

    /// Layered configuration could not be loaded
    #[error(transparent)]
    ConfigSource(#[from] config::ConfigError),

    /// Filesystem failure in the storage collaborator
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Signal table (de)serialization failure
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Metadata sidecar could not be parsed
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// Metadata sidecar could not be written
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl EmgError {
    /// Build a filter failure
    pub fn filter(filter: impl Into<String>, reason: impl Into<String>) -> Self {
        EmgError::Filter {
            filter: filter.into(),
            reason: reason.into(),
        }
    }

    /// Build an extraction failure
    pub fn extraction(extractor: impl Into<String>, reason: impl Into<String>) -> Self {
        EmgError::Extraction {
            extractor: extractor.into(),
            reason: reason.into(),
        }
    }

    /// Build a configuration failure
    pub fn configuration(reason: impl Into<String>) -> Self {
        EmgError::Configuration {
            reason: reason.into(),
        }
    }

    /// Whether the caller can reasonably recover (pick another dataset, read first, ...)
    ///
    /// Shape and capacity failures on the ingestion path are reported per row and
    /// also count as recoverable: the producer may drop the row and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EmgError::NoFiltersScheduled
                | EmgError::StaleReadRequired { .. }
                | EmgError::RowShape { .. }
                | EmgError::Capacity { .. }
                | EmgError::DatasetNotFound { .. }
                | EmgError::MetadataNotFound { .. }
        )
    }
}
