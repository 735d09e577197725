//! Error types for the data-loader crate.

use thiserror::Error;

/// Errors that can occur while loading, parsing, or querying the catalog.
///
/// Loading failures are fatal: the system never runs on a partial catalog.
#[derive(Error, Debug)]
pub enum DataError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record in a data file couldn't be parsed
    #[error("Parse error in {file}: {reason}")]
    Parse { file: String, reason: String },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Referenced entity doesn't exist (e.g., activity for a missing destination)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: u32 },

    /// User id is not present in the Users table
    #[error("Unknown user id {0}")]
    UnknownUser(u32),

    /// Destination id is not present in the Destinations table
    #[error("Unknown destination id {0}")]
    UnknownDestination(u32),

    /// Data validation failed
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataError>;
