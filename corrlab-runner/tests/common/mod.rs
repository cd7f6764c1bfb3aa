//! Shared fixtures for runner integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use corrlab_core::{Column, Dataset};
use corrlab_runner::{CorrelationConfig, ResultRow};

pub fn core_fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("corrlab-core/tests/fixtures")
}

/// The classic 32-car table.
pub fn mtcars() -> Dataset {
    Dataset::load(&core_fixture_dir().join("mtcars.csv")).unwrap()
}

/// mtcars with a text copy of `cyl` whose first three values are missing.
pub fn mtcars_with_missing_strata() -> Dataset {
    let base = mtcars();
    let cyl = base.numeric("cyl").unwrap();
    let labels: Vec<Option<String>> = cyl
        .iter()
        .enumerate()
        .map(|(i, v)| {
            if i < 3 {
                None
            } else {
                v.map(|c| format!("c{c}"))
            }
        })
        .collect();
    let mut columns = base.columns().to_vec();
    columns.push(Column::text("cyl_label", labels));
    Dataset::new(columns).unwrap()
}

pub fn config(predictors: &[&str]) -> CorrelationConfig {
    CorrelationConfig::new("mpg", predictors)
}

pub fn row<'a>(rows: &'a [ResultRow], family: &str, predictor: &str) -> &'a ResultRow {
    rows.iter()
        .find(|r| r.stratification_family == family && r.predictor == predictor)
        .unwrap_or_else(|| panic!("no row for {family}/{predictor}"))
}

pub fn assert_close(actual: f64, expected: f64, rel: f64) {
    let scale = expected.abs().max(f64::MIN_POSITIVE);
    assert!(
        ((actual - expected) / scale).abs() < rel,
        "expected {expected}, got {actual}"
    );
}
