//! Stratum viability filter.
//!
//! A stratum is viable when at least [`MIN_STRATUM_ROWS`] rows satisfy its
//! predicate. Non-viable strata (including empty crossed combinations) are
//! dropped here and never reach the engine.

use log::{debug, info};

use corrlab_core::Dataset;

use crate::strata::StratumDescriptor;

/// Minimum rows a stratum needs before any test is attempted.
pub const MIN_STRATUM_ROWS: usize = 3;

/// A stratum that passed the filter, with its row subset.
#[derive(Debug, Clone)]
pub struct ViableStratum {
    /// Position in the enumeration order.
    pub index: usize,
    pub descriptor: StratumDescriptor,
    pub rows: Vec<usize>,
}

/// Strata that passed and the number that were skipped.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub viable: Vec<ViableStratum>,
    pub skipped: usize,
}

/// Keep the viable strata, preserving enumeration order.
pub fn filter_viable(
    dataset: &Dataset,
    strata: Vec<StratumDescriptor>,
    verbose: bool,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    for (index, descriptor) in strata.into_iter().enumerate() {
        let rows = descriptor.matching_rows(dataset);
        if rows.len() < MIN_STRATUM_ROWS {
            if verbose {
                info!(
                    "skipping stratum [{}]: {} row(s), need {MIN_STRATUM_ROWS}",
                    descriptor.describe(),
                    rows.len()
                );
            } else {
                debug!(
                    "skipping stratum [{}]: {} row(s)",
                    descriptor.describe(),
                    rows.len()
                );
            }
            outcome.skipped += 1;
            continue;
        }
        outcome.viable.push(ViableStratum {
            index,
            descriptor,
            rows,
        });
    }
    outcome
}
