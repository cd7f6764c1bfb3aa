//! In-memory tabular dataset.
//!
//! A `Dataset` is an ordered set of equally long named columns. Numeric
//! columns hold `Option<f64>` (NaN is normalised to `None`), everything else
//! is kept as text. The dataset is immutable once built; every batch reads it
//! through shared references.

use std::collections::{BTreeSet, HashSet};

use super::level::Level;
use super::DatasetError;

/// Values of a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Numeric(v) => v[row].is_none(),
            ColumnData::Text(v) => v[row].is_none(),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    /// Numeric column; NaN values are stored as missing.
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    /// Numeric column from plain floats; NaN marks a missing value.
    pub fn from_f64(name: impl Into<String>, values: &[f64]) -> Self {
        Self::numeric(name, values.iter().map(|&v| Some(v)).collect())
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    pub fn from_strs(name: impl Into<String>, values: &[&str]) -> Self {
        Self::text(name, values.iter().map(|s| Some(s.to_string())).collect())
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The stratification level at `row`.
    pub fn level(&self, row: usize) -> Level {
        match &self.data {
            // -0.0 and 0.0 are one level
            ColumnData::Numeric(v) => v[row].map_or(Level::Missing, |x| Level::Number(x + 0.0)),
            ColumnData::Text(v) => v[row]
                .as_ref()
                .map_or(Level::Missing, |s| Level::Text(s.clone())),
        }
    }

    /// Distinct observed levels, sorted ascending.
    ///
    /// With `drop_missing` the `Missing` level is left out; otherwise it is
    /// included (last) when at least one value is missing.
    pub fn levels(&self, drop_missing: bool) -> Vec<Level> {
        let set: BTreeSet<Level> = (0..self.len())
            .map(|row| self.level(row))
            .filter(|l| !(drop_missing && l.is_missing()))
            .collect();
        set.into_iter().collect()
    }
}

/// An immutable collection of equally long, uniquely named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Dataset {
    /// Build a dataset, validating column lengths and name uniqueness.
    pub fn new(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let n_rows = columns.first().map_or(0, Column::len);

        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(DatasetError::DuplicateColumn(col.name.clone()));
            }
            if col.len() != n_rows {
                return Err(DatasetError::RaggedColumn {
                    column: col.name.clone(),
                    expected: n_rows,
                    actual: col.len(),
                });
            }
        }

        Ok(Self { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Values of a numeric column.
    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>], DatasetError> {
        let col = self
            .column(name)
            .ok_or_else(|| DatasetError::UnknownColumn(name.to_string()))?;
        match &col.data {
            ColumnData::Numeric(v) => Ok(v),
            ColumnData::Text(_) => Err(DatasetError::NotNumeric(name.to_string())),
        }
    }

    /// BLAKE3 fingerprint of the column names, kinds and values.
    ///
    /// Two datasets with the same fingerprint produce identical batches.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for col in &self.columns {
            hasher.update(col.name.as_bytes());
            hasher.update(&[0]);
            match &col.data {
                ColumnData::Numeric(v) => {
                    hasher.update(b"n");
                    for x in v {
                        match x {
                            Some(x) => hasher.update(&x.to_le_bytes()),
                            None => hasher.update(b"\xffNA"),
                        };
                    }
                }
                ColumnData::Text(v) => {
                    hasher.update(b"t");
                    for s in v {
                        match s {
                            Some(s) => {
                                hasher.update(&(s.len() as u64).to_le_bytes());
                                hasher.update(s.as_bytes())
                            }
                            None => hasher.update(b"\xffNA"),
                        };
                    }
                }
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Dataset {
        Dataset::new(vec![
            Column::from_f64("x", &[1.0, 2.0, f64::NAN, 4.0]),
            Column::text(
                "g",
                vec![Some("b".into()), Some("a".into()), None, Some("b".into())],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn signed_zeros_share_a_level() {
        let col = Column::from_f64("z", &[-0.0, 0.0, 1.0, -0.0]);
        assert_eq!(col.levels(true), vec![Level::Number(0.0), Level::Number(1.0)]);
        assert_eq!(col.level(0).to_string(), "0");
        assert!(matches!(col.level(0), Level::Number(v) if v.is_sign_positive()));
    }

    #[test]
    fn nan_is_missing() {
        let ds = small();
        assert_eq!(ds.numeric("x").unwrap()[2], None);
        assert_eq!(ds.n_rows(), 4);
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let err = Dataset::new(vec![
            Column::from_f64("x", &[1.0, 2.0]),
            Column::from_f64("y", &[1.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, DatasetError::RaggedColumn { .. }));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = Dataset::new(vec![
            Column::from_f64("x", &[1.0]),
            Column::from_f64("x", &[2.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateColumn(name) if name == "x"));
    }

    #[test]
    fn text_column_is_not_numeric() {
        let ds = small();
        assert!(matches!(ds.numeric("g"), Err(DatasetError::NotNumeric(_))));
        assert!(matches!(ds.numeric("zzz"), Err(DatasetError::UnknownColumn(_))));
    }

    #[test]
    fn levels_are_sorted_and_respect_missing_flag() {
        let ds = small();
        let g = ds.column("g").unwrap();
        assert_eq!(
            g.levels(true),
            vec![Level::Text("a".into()), Level::Text("b".into())]
        );
        assert_eq!(g.levels(false).last(), Some(&Level::Missing));
        assert_eq!(g.levels(false).len(), 3);
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = small();
        let mut cols = a.columns().to_vec();
        cols[0] = Column::from_f64("x", &[1.0, 2.0, f64::NAN, 5.0]);
        let b = Dataset::new(cols).unwrap();
        assert_eq!(a.fingerprint(), small().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
