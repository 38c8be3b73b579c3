//! CaskDB - Custom Error Types
//! Defines the error hierarchy for the log-structured storage engine.

use std::path::PathBuf;

use thiserror::Error;

/// Custom Result type for the CaskDB engine.
pub type Result<T> = std::result::Result<T, CaskError>;

/// Error types for the CaskDB storage engine.
#[derive(Error, Debug)]
pub enum CaskError {
    /// I/O errors from read, write or fsync on the data file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The data file could not be opened or created.
    #[error("Failed to open data file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A header or record buffer is shorter than its declared size.
    #[error("Format error: {0}")]
    Format(String),

    /// Key or value bytes are not valid UTF-8.
    #[error("Decode error: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    /// A header field does not fit in an unsigned 32-bit integer.
    #[error("Overflow error: {field} = {value} exceeds {}", u32::MAX)]
    Overflow { field: &'static str, value: u64 },

    /// The log ends in the middle of a record.
    #[error("Truncated record at offset {offset}: expected {expected} bytes, found {found}")]
    Truncated { offset: u64, expected: u64, found: u64 },

    /// The log disagrees with the in-memory index.
    #[error("Data corruption detected: {0}")]
    Corruption(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
