//! Reporting and export: CSV, JSON and Markdown renderings of a result table.
//!
//! - **CSV**: one line per row, columns exactly as `ResultTable::column_names`,
//!   missing values written as `NA`
//! - **JSON**: a `RunReport` with schema version, config hash, dataset
//!   fingerprint, summary and rows
//! - **Markdown**: human-readable summary plus the table
//!
//! CSV and JSON keep full floating-point precision; the Markdown table shows
//! four significant digits.

use anyhow::{Context, Result};
use serde::Serialize;

use corrlab_core::{Dataset, Level};

use crate::assemble::{ResultRow, ResultTable, RunSummary};
use crate::config::{ConfigHash, CorrelationConfig};

/// Current schema version of the JSON report.
pub const SCHEMA_VERSION: u32 = 1;

/// Marker for a missing value in text outputs.
pub const NA: &str = "NA";

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| NA.to_string(), |x| x.to_string())
}

fn row_cells(row: &ResultRow, bonferroni: bool) -> Vec<String> {
    let mut cells: Vec<String> = row.strata.iter().map(Level::to_string).collect();
    cells.extend([
        row.stratification_family.clone(),
        row.predictor.clone(),
        row.outcome.clone(),
        row.method.to_string(),
        row.n_pair.to_string(),
        row.cor.to_string(),
        row.p_value.to_string(),
        row.directionality.to_string(),
    ]);
    if bonferroni {
        cells.push(fmt_opt(row.p_bonf));
    }
    cells.push(row.tie_warning.to_string());
    cells
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the table as CSV.
pub fn export_csv(table: &ResultTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(table.column_names())?;
    for row in &table.rows {
        wtr.write_record(row_cells(row, table.bonferroni))?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

/// Self-describing record of one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    pub schema_version: u32,
    pub config_hash: ConfigHash,
    pub dataset_fingerprint: String,
    pub config: &'a CorrelationConfig,
    pub columns: Vec<String>,
    pub summary: &'a RunSummary,
    pub strata_columns: &'a [String],
    pub rows: &'a [ResultRow],
}

impl<'a> RunReport<'a> {
    pub fn new(table: &'a ResultTable, config: &'a CorrelationConfig, dataset: &Dataset) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            config_hash: config.config_hash(),
            dataset_fingerprint: dataset.fingerprint(),
            config,
            columns: table.column_names(),
            summary: &table.summary,
            strata_columns: &table.strata_columns,
            rows: &table.rows,
        }
    }
}

/// Serialize a report to pretty JSON.
pub fn export_json(report: &RunReport<'_>) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize RunReport to JSON")
}

// ─── Markdown report ────────────────────────────────────────────────

/// Human-readable Markdown report.
pub fn generate_report(report: &RunReport<'_>, table: &ResultTable) -> String {
    let mut md = String::new();
    let config = report.config;
    let s = report.summary;

    md.push_str("# Correlation Report\n\n");

    md.push_str("## Configuration\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Outcome | {} |\n", config.outcome));
    md.push_str(&format!("| Method | {} |\n", config.method));
    md.push_str(&format!("| Directionality | {} |\n", config.directionality));
    md.push_str(&format!("| Missing Data | {} |\n", config.missing));
    if !config.stratification_vars.is_empty() {
        md.push_str(&format!(
            "| Stratification | {} ({}) |\n",
            config.stratification_vars.join(", "),
            config.stratification_mode
        ));
    }
    if config.bonferroni_correct {
        md.push_str(&format!("| Bonferroni | {} |\n", config.bonferroni_scope));
    } else {
        md.push_str("| Bonferroni | off |\n");
    }
    md.push_str(&format!("| Config Hash | {} |\n", report.config_hash));
    md.push_str(&format!(
        "| Dataset Fingerprint | {} |\n",
        report.dataset_fingerprint
    ));
    md.push('\n');

    md.push_str("## Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!(
        "| Strata (viable / enumerated) | {} / {} |\n",
        s.strata_viable, s.strata_enumerated
    ));
    md.push_str(&format!("| Tests Attempted | {} |\n", s.tests_attempted));
    md.push_str(&format!("| Tests Computed | {} |\n", s.tests_computed));
    md.push_str(&format!("| Undefined | {} |\n", s.tests_undefined));
    md.push_str(&format!("| Failed | {} |\n", s.tests_failed));
    md.push_str(&format!("| Tie Warnings | {} |\n", s.tie_warnings));
    for family in &s.families {
        md.push_str(&format!("| Family '{}' m | {} |\n", family.label, family.m));
    }
    md.push('\n');

    md.push_str("## Results\n\n");
    let columns = table.column_names();
    md.push_str(&format!("| {} |\n", columns.join(" | ")));
    md.push_str(&format!("|{}\n", " --- |".repeat(columns.len())));
    for row in &table.rows {
        let cells: Vec<String> = row_cells(row, table.bonferroni)
            .into_iter()
            .map(|c| match c.parse::<f64>() {
                Ok(v) if c.contains('.') || c.contains('e') => format!("{v:.4e}"),
                _ => c,
            })
            .collect();
        md.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use corrlab_core::{Alternative, Column, Method};

    fn table() -> ResultTable {
        ResultTable {
            strata_columns: vec!["cyl".into()],
            bonferroni: true,
            rows: vec![
                ResultRow {
                    strata: vec![Level::Missing],
                    stratification_family: "unstratified".into(),
                    predictor: "disp".into(),
                    outcome: "mpg".into(),
                    method: Method::Pearson,
                    n_pair: 32,
                    cor: -0.5,
                    p_value: 0.001,
                    directionality: Alternative::TwoSided,
                    p_bonf: Some(0.002),
                    tie_warning: false,
                },
                ResultRow {
                    strata: vec![Level::Number(4.0)],
                    stratification_family: "cyl".into(),
                    predictor: "disp".into(),
                    outcome: "mpg".into(),
                    method: Method::Spearman,
                    n_pair: 11,
                    cor: -0.25,
                    p_value: 0.5,
                    directionality: Alternative::Less,
                    p_bonf: Some(1.0),
                    tie_warning: true,
                },
            ],
            summary: RunSummary::default(),
        }
    }

    #[test]
    fn csv_has_header_and_na_markers() {
        let csv = export_csv(&table()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "cyl,stratification_family,predictor,outcome,method,n_pair,cor,p_value,directionality,p_bonf,tie_warning"
        );
        assert_eq!(
            lines[1],
            "NA,unstratified,disp,mpg,pearson,32,-0.5,0.001,two.sided,0.002,false"
        );
        assert_eq!(lines[2], "4,cyl,disp,mpg,spearman,11,-0.25,0.5,less,1,true");
    }

    #[test]
    fn json_report_carries_provenance() {
        let t = table();
        let config = CorrelationConfig::new("mpg", &["disp"]);
        let ds = Dataset::new(vec![Column::from_f64("mpg", &[1.0, 2.0, 3.0])]).unwrap();
        let report = RunReport::new(&t, &config, &ds);
        let json = export_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["schema_version"], 1);
        assert_eq!(value["config_hash"], config.config_hash());
        assert_eq!(value["rows"].as_array().unwrap().len(), 2);
        assert!(value["rows"][0]["strata"][0].is_null());
        assert_eq!(value["rows"][1]["method"], "spearman");
    }

    #[test]
    fn markdown_lists_every_row() {
        let t = table();
        let config = CorrelationConfig::new("mpg", &["disp"]);
        let ds = Dataset::new(vec![Column::from_f64("mpg", &[1.0, 2.0, 3.0])]).unwrap();
        let md = generate_report(&RunReport::new(&t, &config, &ds), &t);
        assert!(md.contains("# Correlation Report"));
        assert!(md.contains("| Outcome | mpg |"));
        assert!(md.contains("| cyl | stratification_family |"));
        assert_eq!(md.lines().filter(|l| l.contains("| disp |")).count(), 2);
    }
}
