//! Error types for creep detection and WiGLE log handling.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a log or detecting creeps.
#[derive(Debug, Error)]
pub enum Error {
    /// No observations were provided
    #[error("No observations to analyze")]
    EmptyInput,

    /// An observation is missing its identity or a usable position
    #[error("Malformed observation #{index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    /// Distance unit token outside km|m|mi|nmi|ft|in|rad|deg
    #[error("Unsupported distance unit '{0}' (expected km|m|mi|nmi|ft|in|rad|deg)")]
    UnsupportedUnit(String),

    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV structure could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A log row has a missing or unparseable required field
    #[error("Log line {line}: {message}")]
    Log { line: u64, message: String },
}

impl Error {
    /// Creates a malformed record error.
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            index,
            reason: reason.into(),
        }
    }

    /// Creates a log row error.
    pub fn log(line: u64, message: impl std::fmt::Display) -> Self {
        Self::Log {
            line,
            message: message.to_string(),
        }
    }
}
