pub mod dataset;
pub mod ingest;
pub mod level;
pub mod select;

pub use dataset::{Column, ColumnData, Dataset};
pub use level::{format_number, Level};
pub use select::{resolve_columns, SelectError, Selector};

use thiserror::Error;

/// Errors from building or loading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{0}' is not numeric")]
    NotNumeric(String),

    #[error("failed to read '{path}': {reason}")]
    IngestFailed { path: String, reason: String },

    #[error("column '{column}': {reason}")]
    Polars { column: String, reason: String },

    #[error("unsupported data file '{0}' (expected .csv or .parquet)")]
    UnsupportedFormat(String),
}
