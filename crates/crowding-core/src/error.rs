use thiserror::Error;

use crowding_parser::{DecodeError, ParserError, SchemaError};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Parser(#[from] ParserError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
