//! Error types for a sas2mongo run.
//!
//! Every variant is fatal: a run either finishes and reports its record count,
//! or stops at the first error. Rows inserted before the failure stay in the
//! target collection.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for sas2mongo operations.
#[derive(Debug, Error)]
pub enum Sas2MongoError {
    /// Invalid or inconsistent invocation parameters
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Input file suffix is neither `.sas7bdat` nor `.csv`
    #[error("Unsupported input format: {} (expected a .sas7bdat or .csv file)", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Target collection already holds documents and no action was given
    #[error("Collection '{collection}' is not empty ({count} documents), but --action is not specified")]
    CollectionNotEmpty { collection: String, count: u64 },

    /// Input file could not be opened or read
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV input could not be parsed
    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    /// SAS7BDAT input could not be parsed
    #[error("SAS7BDAT read failed: {0}")]
    Sas(#[from] sas7bdat::Error),

    /// Connection, count, drop or insert failed
    #[error("Database operation failed: {context}")]
    Database {
        context: String,
        #[source]
        source: mongodb::error::Error,
    },

    /// A row does not have one cell per header column
    #[error("Row {row}: expected {expected} values but found {found}")]
    RowLength {
        row: u64,
        expected: usize,
        found: usize,
    },

    /// Documents could not be rendered for output
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Sas2MongoError {
    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Wraps a driver error with context
    pub fn database(context: impl Into<String>, source: mongodb::error::Error) -> Self {
        Self::Database {
            context: context.into(),
            source,
        }
    }
}

/// Convenience type alias for Results with Sas2MongoError
pub type Result<T> = std::result::Result<T, Sas2MongoError>;
