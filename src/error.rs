//! Error types for the console's I/O boundary.
//!
//! The model itself is total: malformed field input degrades to absent
//! derived fields, never to an error. Errors only arise reading scripted
//! operations or the seed list.

use thiserror::Error;

/// Result type alias for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Errors that can occur at the I/O boundary.
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Failed to open or read an input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON seed list
    #[error("Seed list error: {0}")]
    Seed(#[from] serde_json::Error),

    /// Missing input file argument
    #[error("Missing input file argument. Usage: payment-methods <ops.csv> [seed.json]")]
    MissingArgument,
}
