use std::path::PathBuf;

use thiserror::Error;

/// Failure while reading the listings source. Fatal for the load attempt.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow decode failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("{0}")]
    Malformed(String),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    /// `row` is the zero-based data row (header excluded); the message
    /// counts from one.
    #[error("row {}, column '{column}': {reason}", one_based(.row))]
    InvalidValue {
        row: usize,
        column: &'static str,
        reason: String,
    },

    #[error("dataset contains no listings")]
    Empty,
}

fn one_based(row: &usize) -> usize {
    row + 1
}

/// An aggregate referred to a column, measure or dimension the schema does
/// not have. Indicates a programming error in the chart catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("'{0}' is not a numeric measure")]
    UnknownMeasure(String),

    #[error("'{0}' is a numeric measure and cannot be grouped on")]
    NotGroupable(String),
}
