//! Correlation engine: one test per (viable stratum, predictor).
//!
//! Units of work are independent and run on the rayon pool unless
//! parallelism is switched off. A failing unit is recorded in its
//! `RawResult`; it never aborts the batch.

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use corrlab_core::stats::{cor_test, CorTestError};
use corrlab_core::{Alternative, Dataset, DatasetError, Method, MissingPolicy};

use crate::filter::ViableStratum;
use crate::variables::PredictorSpec;

/// What became of one unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ResultStatus {
    /// Estimate and p-value are defined.
    Computed,
    /// Fewer than three complete pairs, or a degenerate statistic.
    Undefined,
    /// The test refused the input (e.g. missing values under `all.obs`).
    Failed(String),
}

/// Output of one (stratum, predictor) test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    /// Enumeration index of the stratum.
    pub stratum_index: usize,
    pub predictor_index: usize,
    pub unstratified: bool,
    pub predictor: String,
    pub outcome: String,
    pub method: Method,
    pub directionality: Alternative,
    pub n_pairs: usize,
    pub estimate: Option<f64>,
    pub p_value: Option<f64>,
    pub tie_warning: bool,
    pub status: ResultStatus,
}

impl RawResult {
    pub fn is_computed(&self) -> bool {
        self.status == ResultStatus::Computed
    }
}

/// Runs the correlation primitive over a batch of strata and predictors.
pub struct CorrelationEngine<'a> {
    dataset: &'a Dataset,
    outcome: &'a str,
    missing: MissingPolicy,
    parallel: bool,
    verbose: bool,
}

impl<'a> CorrelationEngine<'a> {
    pub fn new(dataset: &'a Dataset, outcome: &'a str, missing: MissingPolicy) -> Self {
        Self {
            dataset,
            outcome,
            missing,
            parallel: true,
            verbose: false,
        }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Raise per-unit diagnostics from debug to info.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Test every predictor in every stratum.
    ///
    /// Results come back ordered by (stratum, predictor). Fails only when
    /// the outcome or a predictor is not a numeric column.
    pub fn run(
        &self,
        strata: &[ViableStratum],
        specs: &[PredictorSpec],
    ) -> Result<Vec<RawResult>, DatasetError> {
        let outcome = self.dataset.numeric(self.outcome)?;
        let predictors = specs
            .iter()
            .map(|spec| self.dataset.numeric(&spec.name))
            .collect::<Result<Vec<_>, _>>()?;

        let units: Vec<(usize, usize)> = (0..strata.len())
            .flat_map(|s| (0..specs.len()).map(move |p| (s, p)))
            .collect();

        let evaluate = |&(s, p): &(usize, usize)| {
            let stratum = &strata[s];
            let x: Vec<Option<f64>> = stratum.rows.iter().map(|&r| predictors[p][r]).collect();
            let y: Vec<Option<f64>> = stratum.rows.iter().map(|&r| outcome[r]).collect();
            self.evaluate(stratum, p, &specs[p], &x, &y)
        };

        let mut results: Vec<RawResult> = if self.parallel {
            units.par_iter().map(evaluate).collect()
        } else {
            units.iter().map(evaluate).collect()
        };
        results.sort_by_key(|r| (r.stratum_index, r.predictor_index));
        Ok(results)
    }

    fn evaluate(
        &self,
        stratum: &ViableStratum,
        predictor_index: usize,
        spec: &PredictorSpec,
        x: &[Option<f64>],
        y: &[Option<f64>],
    ) -> RawResult {
        let mut result = RawResult {
            stratum_index: stratum.index,
            predictor_index,
            unstratified: stratum.descriptor.is_unstratified(),
            predictor: spec.name.clone(),
            outcome: self.outcome.to_string(),
            method: spec.method,
            directionality: spec.directionality,
            n_pairs: 0,
            estimate: None,
            p_value: None,
            tie_warning: false,
            status: ResultStatus::Undefined,
        };

        match cor_test(x, y, spec.method, spec.directionality, self.missing) {
            Ok(test) => {
                result.n_pairs = test.n_pairs;
                result.estimate = test.estimate;
                result.p_value = test.p_value;
                result.tie_warning = test.tie_warning;
                if test.is_defined() {
                    result.status = ResultStatus::Computed;
                } else {
                    self.diagnose(stratum, spec, "statistic undefined");
                }
            }
            Err(CorTestError::InsufficientPairs { n }) => {
                result.n_pairs = n;
                self.diagnose(stratum, spec, &format!("only {n} complete pair(s)"));
            }
            Err(err) => {
                self.diagnose(stratum, spec, &err.to_string());
                result.status = ResultStatus::Failed(err.to_string());
            }
        }

        if result.tie_warning {
            debug!(
                "[{}] {} ~ {}: ties present, {} p-value is approximate",
                stratum.descriptor.describe(),
                spec.name,
                self.outcome,
                spec.method
            );
        }
        result
    }

    fn diagnose(&self, stratum: &ViableStratum, spec: &PredictorSpec, reason: &str) {
        if self.verbose {
            info!(
                "[{}] {} ~ {}: {reason}; no row emitted",
                stratum.descriptor.describe(),
                spec.name,
                self.outcome
            );
        } else {
            debug!(
                "[{}] {} ~ {}: {reason}",
                stratum.descriptor.describe(),
                spec.name,
                self.outcome
            );
        }
    }
}
