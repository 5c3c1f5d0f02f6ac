use std::fmt;

use thiserror::Error;

/// One failed decode-and-parse attempt for a candidate encoding.
#[derive(Debug, Clone)]
pub struct DecodeAttempt {
    pub encoding: &'static str,
    pub message: String,
}

impl DecodeAttempt {
    pub fn new(encoding: &'static str, message: impl Into<String>) -> Self {
        Self {
            encoding,
            message: message.into(),
        }
    }
}

impl fmt::Display for DecodeAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.encoding, self.message)
    }
}

/// Every candidate encoding was exhausted without producing a parseable table.
#[derive(Debug, Error)]
#[error("no candidate encoding decoded the export; attempts: {attempts:?}")]
pub struct DecodeError {
    pub attempts: Vec<DecodeAttempt>,
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("required identity columns missing: {columns:?}")]
    MissingIdentityColumns { columns: Vec<String> },

    #[error("no time-of-day columns (e.g. '5시30분') detected in header")]
    NoTimeColumns,

    // Reachable only for digit characters str::parse does not accept,
    // e.g. non-ASCII numerals that pass the column pattern.
    #[error("time column '{column}' has unparseable digits: {message}")]
    TimeDigits { column: String, message: String },
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}
