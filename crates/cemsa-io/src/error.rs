//! Error types for structure and sequence file I/O

use thiserror::Error;

/// Errors that can occur while reading or writing files
#[derive(Error, Debug)]
pub enum IoError {
    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error with location information
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// Line number where the error occurred (1-based)
        line: usize,
        /// Error message
        message: String,
    },

    /// Invalid record in the file
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// File is empty or contains no atoms / records
    #[error("Empty file or no records found")]
    EmptyFile,

    /// Decompression error
    #[error("Decompression error: {0}")]
    Decompression(String),
}

impl IoError {
    /// Create a parse error at a specific line
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        IoError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid record error
    pub fn invalid_record(record: impl Into<String>) -> Self {
        IoError::InvalidRecord(record.into())
    }
}

/// Result type for file I/O operations
pub type IoResult<T> = Result<T, IoError>;
