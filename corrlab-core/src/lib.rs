//! CorrLab Core: datasets, column selection and correlation tests.
//!
//! This crate contains everything below the batch layer:
//! - Test configuration enums (method, alternative, missing-data policy)
//! - The in-memory `Dataset` with CSV/Parquet ingestion through polars
//! - Column selection expressions for predictor lists
//! - Pearson, Kendall tau-b and Spearman tests with exact and asymptotic p-values

pub mod data;
pub mod domain;
pub mod stats;

pub use data::{Column, ColumnData, Dataset, DatasetError, Level};
pub use domain::{Alternative, Method, MissingPolicy, ParseEnumError};
pub use stats::{cor_test, CorTest, CorTestError};
