//! Dataset ingestion from CSV and Parquet via Polars.
//!
//! Integer and floating-point columns become numeric columns; every other
//! dtype is cast to text. Float NaN values are treated as missing.

use polars::prelude::*;
use std::path::Path;

use super::dataset::{Column as DataColumn, Dataset};
use super::DatasetError;

impl Dataset {
    /// Convert a Polars DataFrame, preserving column order.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self, DatasetError> {
        let map_err = |name: &str, e: PolarsError| DatasetError::Polars {
            column: name.to_string(),
            reason: e.to_string(),
        };

        let mut columns = Vec::with_capacity(df.width());
        for col in df.get_columns() {
            let name = col.name().to_string();
            let dtype = col.dtype();

            if dtype.is_float() || dtype.is_integer() {
                let cast = col
                    .cast(&DataType::Float64)
                    .map_err(|e| map_err(&name, e))?;
                let values: Vec<Option<f64>> = cast
                    .f64()
                    .map_err(|e| map_err(&name, e))?
                    .into_iter()
                    .collect();
                columns.push(DataColumn::numeric(name, values));
            } else {
                let cast = col
                    .cast(&DataType::String)
                    .map_err(|e| map_err(&name, e))?;
                let values: Vec<Option<String>> = cast
                    .str()
                    .map_err(|e| map_err(&name, e))?
                    .into_iter()
                    .map(|v| v.map(str::to_string))
                    .collect();
                columns.push(DataColumn::text(name, values));
            }
        }

        let dataset = Dataset::new(columns)?;
        log::debug!(
            "converted dataframe: {} rows x {} columns",
            dataset.n_rows(),
            dataset.n_columns()
        );
        Ok(dataset)
    }

    /// Read a CSV file with a header row.
    pub fn from_csv_path(path: &Path) -> Result<Self, DatasetError> {
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|e| DatasetError::IngestFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Self::from_dataframe(&df)
    }

    /// Read a Parquet file.
    pub fn from_parquet_path(path: &Path) -> Result<Self, DatasetError> {
        let df = LazyFrame::scan_parquet(path, Default::default())
            .and_then(|lf| lf.collect())
            .map_err(|e| DatasetError::IngestFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Self::from_dataframe(&df)
    }

    /// Read a dataset, choosing the reader from the file extension.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Self::from_csv_path(path),
            "parquet" | "pq" => Self::from_parquet_path(path),
            _ => Err(DatasetError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ColumnData;

    #[test]
    fn dataframe_columns_keep_order_and_kind() {
        let df = DataFrame::new(vec![
            Column::new("grp".into(), &["a", "b", "a"]),
            Column::new("x".into(), &[1.5, f64::NAN, 3.0]),
            Column::new("n".into(), &[1i64, 2, 3]),
        ])
        .unwrap();

        let ds = Dataset::from_dataframe(&df).unwrap();
        assert_eq!(ds.column_names(), vec!["grp", "x", "n"]);
        assert!(!ds.column("grp").unwrap().is_numeric());
        assert_eq!(ds.numeric("x").unwrap(), &[Some(1.5), None, Some(3.0)]);
        assert_eq!(
            ds.column("n").unwrap().data,
            ColumnData::Numeric(vec![Some(1.0), Some(2.0), Some(3.0)])
        );
    }

    #[test]
    fn csv_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.csv");
        std::fs::write(&path, "g,x,y\na,1,2.5\nb,2,\na,3,4.5\n").unwrap();

        let ds = Dataset::load(&path).unwrap();
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.numeric("y").unwrap(), &[Some(2.5), None, Some(4.5)]);
        assert!(!ds.column("g").unwrap().is_numeric());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = Dataset::load(Path::new("data.xlsx")).unwrap_err();
        assert!(matches!(err, DatasetError::UnsupportedFormat(_)));
    }
}
