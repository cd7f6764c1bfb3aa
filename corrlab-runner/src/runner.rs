//! Batch runner: wires resolver, enumerator, filter, engine, corrector and
//! assembler together.
//!
//! Every configuration check happens before the first test is computed, so a
//! configuration error never yields a partial table.

use log::info;
use thiserror::Error;

use corrlab_core::data::{resolve_columns, SelectError, Selector};
use corrlab_core::{Dataset, DatasetError};

use crate::assemble::{assemble, stratification_columns, ResultTable, RunSummary};
use crate::bonferroni::correct;
use crate::config::{ConfigError, CorrelationConfig};
use crate::engine::CorrelationEngine;
use crate::filter::filter_viable;
use crate::strata::enumerate_strata;
use crate::variables::{resolve_predictor_specs, PredictorSpec};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DatasetError),
    #[error("selection error: {0}")]
    Select(#[from] SelectError),
}

/// Column names and test settings after every selection has been resolved.
#[derive(Debug, Clone)]
pub struct ResolvedPlan {
    pub outcome: String,
    pub predictors: Vec<PredictorSpec>,
    pub stratification_vars: Vec<String>,
}

fn require_numeric(dataset: &Dataset, role: &'static str, name: &str) -> Result<(), ConfigError> {
    match dataset.column(name) {
        None => Err(ConfigError::UnknownColumn {
            role,
            column: name.to_string(),
        }),
        Some(col) if !col.is_numeric() => Err(ConfigError::NotNumeric {
            role,
            column: name.to_string(),
        }),
        Some(_) => Ok(()),
    }
}

/// Resolve selections and per-predictor settings against the dataset.
///
/// Pattern selectors such as `where(is.numeric)` never pick the outcome. It
/// stays a predictor only when named explicitly, which yields its
/// self-correlation.
pub fn resolve_plan(dataset: &Dataset, config: &CorrelationConfig) -> Result<ResolvedPlan, ConfigError> {
    require_numeric(dataset, "outcome", &config.outcome)?;

    let outcome_named = config.predictors.iter().any(|expr| {
        matches!(expr.parse::<Selector>(), Ok(Selector::Name(name)) if name == config.outcome)
    });

    let predictors: Vec<String> = resolve_columns(&config.predictors, dataset)
        .map_err(|source| ConfigError::Selection {
            field: "predictors",
            source,
        })?
        .into_iter()
        .filter(|name| outcome_named || *name != config.outcome)
        .collect();
    if predictors.is_empty() {
        return Err(ConfigError::EmptyPredictors);
    }
    for name in &predictors {
        require_numeric(dataset, "predictor", name)?;
    }

    let stratification_vars = if config.stratification_vars.is_empty() {
        Vec::new()
    } else {
        resolve_columns(&config.stratification_vars, dataset).map_err(|source| {
            ConfigError::Selection {
                field: "stratification_vars",
                source,
            }
        })?
    };

    let specs = resolve_predictor_specs(
        &predictors,
        config.method,
        &config.method_map,
        config.directionality,
        &config.directionality_map,
    )?;

    Ok(ResolvedPlan {
        outcome: config.outcome.clone(),
        predictors: specs,
        stratification_vars,
    })
}

/// Run the full correlation battery.
pub fn run_correlations(
    dataset: &Dataset,
    config: &CorrelationConfig,
) -> Result<ResultTable, RunError> {
    let plan = resolve_plan(dataset, config)?;

    let strata = enumerate_strata(
        dataset,
        &plan.stratification_vars,
        config.stratification_mode,
        config.drop_missing_strata,
    )?;
    let strata_columns = stratification_columns(&strata);
    let enumerated = strata.len();

    let filtered = filter_viable(dataset, strata, config.verbose);

    let raw = CorrelationEngine::new(dataset, &plan.outcome, config.missing)
        .with_parallelism(config.parallel)
        .with_verbose(config.verbose)
        .run(&filtered.viable, &plan.predictors)?;

    let correction = correct(&raw, config.bonferroni_correct, config.bonferroni_scope);

    let summary = RunSummary {
        strata_enumerated: enumerated,
        strata_viable: filtered.viable.len(),
        strata_skipped: filtered.skipped,
        ..RunSummary::default()
    };
    let table = assemble(
        strata_columns,
        &filtered.viable,
        &raw,
        &correction,
        config.bonferroni_correct,
        summary,
    );

    let s = &table.summary;
    info!(
        "{} ~ {} predictor(s): {} of {} strata viable, {} test(s) computed, {} undefined, {} failed",
        plan.outcome,
        plan.predictors.len(),
        s.strata_viable,
        s.strata_enumerated,
        s.tests_computed,
        s.tests_undefined,
        s.tests_failed
    );
    Ok(table)
}
