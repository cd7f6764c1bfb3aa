//! Result assembly: join raw results with their strata and corrections.
//!
//! Rows appear in stratum enumeration order, then predictor input order.
//! Only computed results become rows; undefined and failed ones are counted
//! in the summary and otherwise omitted.

use serde::{Deserialize, Serialize};

use corrlab_core::{Alternative, Level, Method};

use crate::bonferroni::{Correction, FamilySize};
use crate::engine::{RawResult, ResultStatus};
use crate::filter::ViableStratum;
use crate::strata::StratumDescriptor;

/// One line of the output table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    /// One level per stratification column; `Missing` where the stratum
    /// does not constrain that variable.
    pub strata: Vec<Level>,
    pub stratification_family: String,
    pub predictor: String,
    pub outcome: String,
    pub method: Method,
    pub n_pair: usize,
    pub cor: f64,
    pub p_value: f64,
    pub directionality: Alternative,
    pub p_bonf: Option<f64>,
    pub tie_warning: bool,
}

/// Counts describing what happened during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub strata_enumerated: usize,
    pub strata_viable: usize,
    pub strata_skipped: usize,
    pub tests_attempted: usize,
    pub tests_computed: usize,
    pub tests_undefined: usize,
    pub tests_failed: usize,
    pub tie_warnings: usize,
    pub families: Vec<FamilySize>,
}

/// The assembled output of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    pub strata_columns: Vec<String>,
    /// Whether the `p_bonf` column is part of the schema.
    pub bonferroni: bool,
    pub rows: Vec<ResultRow>,
    pub summary: RunSummary,
}

impl ResultTable {
    /// Column names in output order.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = self.strata_columns.clone();
        names.extend(
            [
                "stratification_family",
                "predictor",
                "outcome",
                "method",
                "n_pair",
                "cor",
                "p_value",
                "directionality",
            ]
            .map(String::from),
        );
        if self.bonferroni {
            names.push("p_bonf".to_string());
        }
        names.push("tie_warning".to_string());
        names
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows belonging to one stratification family.
    pub fn family<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a ResultRow> + 'a {
        self.rows
            .iter()
            .filter(move |r| r.stratification_family == label)
    }
}

/// Distinct constrained variables in order of first use.
pub fn stratification_columns(strata: &[StratumDescriptor]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for (name, _) in strata.iter().flat_map(|s| &s.constraints) {
        if !columns.contains(name) {
            columns.push(name.clone());
        }
    }
    columns
}

/// Build the output table.
///
/// `raw` and `correction.p_bonf` are aligned and ordered by
/// (stratum, predictor).
pub fn assemble(
    strata_columns: Vec<String>,
    viable: &[ViableStratum],
    raw: &[RawResult],
    correction: &Correction,
    bonferroni: bool,
    mut summary: RunSummary,
) -> ResultTable {
    let mut rows = Vec::new();
    for (pos, result) in raw.iter().enumerate() {
        match &result.status {
            ResultStatus::Computed => summary.tests_computed += 1,
            ResultStatus::Undefined => {
                summary.tests_undefined += 1;
                continue;
            }
            ResultStatus::Failed(_) => {
                summary.tests_failed += 1;
                continue;
            }
        }
        let (Some(cor), Some(p_value)) = (result.estimate, result.p_value) else {
            continue;
        };
        let Some(stratum) = viable.iter().find(|s| s.index == result.stratum_index) else {
            continue;
        };
        if result.tie_warning {
            summary.tie_warnings += 1;
        }

        rows.push(ResultRow {
            strata: strata_columns
                .iter()
                .map(|col| {
                    stratum
                        .descriptor
                        .level_of(col)
                        .cloned()
                        .unwrap_or(Level::Missing)
                })
                .collect(),
            stratification_family: stratum.descriptor.family.clone(),
            predictor: result.predictor.clone(),
            outcome: result.outcome.clone(),
            method: result.method,
            n_pair: result.n_pairs,
            cor,
            p_value,
            directionality: result.directionality,
            p_bonf: if bonferroni {
                correction.p_bonf.get(pos).copied().flatten()
            } else {
                None
            },
            tie_warning: result.tie_warning,
        });
    }

    summary.tests_attempted = raw.len();
    summary.families = correction.families.clone();

    ResultTable {
        strata_columns,
        bonferroni,
        rows,
        summary,
    }
}
