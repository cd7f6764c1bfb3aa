//! Bivariate correlation hypothesis tests.
//!
//! `cor_test` is the single entry point: it applies the missing-data policy
//! to a pair of columns, enforces the three-pair minimum, and dispatches to
//! the Pearson, Kendall or Spearman implementation.
//!
//! Degenerate inputs (zero variance, missing values under `everything`)
//! produce a `CorTest` with no estimate rather than an error. Errors are
//! reserved for conditions the caller may want to report separately.

pub mod distribution;
pub mod kendall;
pub mod pearson;
pub mod rank;
pub mod spearman;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Alternative, Method, MissingPolicy};

/// Minimum number of complete pairs for any correlation test.
pub const MIN_PAIRS: usize = 3;

/// Reasons a correlation test could not be run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorTestError {
    #[error("not enough complete pairs: {n} (need at least {MIN_PAIRS})")]
    InsufficientPairs { n: usize },

    #[error("{count} missing observation(s) with missing-data policy 'all.obs'")]
    MissingObservations { count: usize },

    #[error("no complete cases with missing-data policy 'complete.obs'")]
    NoCompleteCases,

    #[error("x and y differ in length ({x} vs {y})")]
    LengthMismatch { x: usize, y: usize },
}

/// Outcome of one correlation test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorTest {
    pub method: Method,
    pub alternative: Alternative,
    /// Complete pairs the test was computed on.
    pub n_pairs: usize,
    /// Correlation coefficient (r, tau-b or rho).
    pub estimate: Option<f64>,
    /// Test statistic: t (Pearson), T or z (Kendall), S (Spearman).
    pub statistic: Option<f64>,
    pub p_value: Option<f64>,
    /// Whether the p-value comes from the exact null distribution.
    pub exact: bool,
    /// Ties made the exact p-value infeasible; an approximation was used.
    pub tie_warning: bool,
}

impl CorTest {
    /// A test whose statistic is undefined on this input.
    pub fn undefined(method: Method, alternative: Alternative, n_pairs: usize) -> Self {
        Self {
            method,
            alternative,
            n_pairs,
            estimate: None,
            statistic: None,
            p_value: None,
            exact: false,
            tie_warning: false,
        }
    }

    /// Both the estimate and the p-value are available.
    pub fn is_defined(&self) -> bool {
        self.estimate.is_some() && self.p_value.is_some()
    }
}

/// Apply the missing-data policy to a pair of columns.
///
/// Returns the complete pairs, or `None` when the policy makes the statistic
/// undefined (`everything` with missing values). With only two variables,
/// `complete.obs` and `na.or.complete` drop the same rows as pairwise
/// deletion and differ only in how an empty result is reported.
pub fn complete_pairs(
    x: &[Option<f64>],
    y: &[Option<f64>],
    policy: MissingPolicy,
) -> Result<(Option<(Vec<f64>, Vec<f64>)>, usize), CorTestError> {
    if x.len() != y.len() {
        return Err(CorTestError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }

    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .unzip();
    let complete = xs.len();
    let missing = x.len() - complete;

    match policy {
        MissingPolicy::Everything if missing > 0 => Ok((None, complete)),
        MissingPolicy::AllObs if missing > 0 => {
            Err(CorTestError::MissingObservations { count: missing })
        }
        MissingPolicy::CompleteObs if complete == 0 => Err(CorTestError::NoCompleteCases),
        _ => Ok((Some((xs, ys)), complete)),
    }
}

/// Run a correlation test on two columns with possibly missing values.
pub fn cor_test(
    x: &[Option<f64>],
    y: &[Option<f64>],
    method: Method,
    alternative: Alternative,
    missing: MissingPolicy,
) -> Result<CorTest, CorTestError> {
    let (pairs, complete) = complete_pairs(x, y, missing)?;
    if complete < MIN_PAIRS {
        return Err(CorTestError::InsufficientPairs { n: complete });
    }
    let Some((xs, ys)) = pairs else {
        return Ok(CorTest::undefined(method, alternative, complete));
    };

    Ok(cor_test_complete(&xs, &ys, method, alternative))
}

/// Run a correlation test on complete, equally long samples.
///
/// The caller guarantees at least [`MIN_PAIRS`] values.
pub fn cor_test_complete(x: &[f64], y: &[f64], method: Method, alternative: Alternative) -> CorTest {
    match method {
        Method::Pearson => pearson::test(x, y, alternative),
        Method::Kendall => kendall::test(x, y, alternative),
        Method::Spearman => spearman::test(x, y, alternative),
    }
}
