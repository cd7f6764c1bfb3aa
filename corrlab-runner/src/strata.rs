//! Stratum enumeration.
//!
//! The unstratified stratum always comes first. After it:
//! - `separate`: one stratum per level of each variable, variables in input order
//! - `crossed`: one stratum per combination of levels, first variable slowest
//!
//! Levels are sorted ascending (numbers numerically, then text, missing last),
//! so the enumeration order never depends on row order.

use serde::Serialize;

use corrlab_core::{Dataset, Level};

use crate::config::{ConfigError, StratificationMode};

/// Family label of the whole-dataset stratum.
pub const UNSTRATIFIED: &str = "unstratified";

/// Joins variable names in crossed family labels.
pub const CROSS_SEPARATOR: &str = "×";

/// One subgroup of rows, defined by equality constraints on stratification
/// variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StratumDescriptor {
    pub family: String,
    pub constraints: Vec<(String, Level)>,
}

impl StratumDescriptor {
    pub fn unstratified() -> Self {
        Self {
            family: UNSTRATIFIED.to_string(),
            constraints: Vec::new(),
        }
    }

    pub fn is_unstratified(&self) -> bool {
        self.constraints.is_empty()
    }

    /// The level this stratum fixes for `variable`, if any.
    pub fn level_of(&self, variable: &str) -> Option<&Level> {
        self.constraints
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, level)| level)
    }

    /// Human-readable constraint list, e.g. `cyl=4, gear=3`.
    pub fn describe(&self) -> String {
        if self.is_unstratified() {
            return UNSTRATIFIED.to_string();
        }
        self.constraints
            .iter()
            .map(|(name, level)| format!("{name}={level}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Row predicate: every constraint holds.
    ///
    /// `Missing` only equals `Missing`, so with dropped missing levels a row
    /// with a missing stratification value never matches.
    pub fn matches(&self, dataset: &Dataset, row: usize) -> bool {
        self.constraints.iter().all(|(name, level)| {
            dataset
                .column(name)
                .is_some_and(|col| col.level(row) == *level)
        })
    }

    /// Indices of the rows satisfying the predicate, ascending.
    pub fn matching_rows(&self, dataset: &Dataset) -> Vec<usize> {
        (0..dataset.n_rows())
            .filter(|&row| self.matches(dataset, row))
            .collect()
    }
}

/// Iterative Cartesian product over per-variable level lists.
///
/// Yields index vectors with the last position varying fastest. Any empty
/// list makes the product empty.
pub struct Odometer {
    radices: Vec<usize>,
    current: Option<Vec<usize>>,
}

impl Odometer {
    pub fn new(radices: Vec<usize>) -> Self {
        let current = if radices.iter().any(|&r| r == 0) {
            None
        } else {
            Some(vec![0; radices.len()])
        };
        Self { radices, current }
    }
}

impl Iterator for Odometer {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let out = self.current.clone()?;
        let mut next = out.clone();
        let mut pos = next.len();
        loop {
            if pos == 0 {
                self.current = None;
                break;
            }
            pos -= 1;
            next[pos] += 1;
            if next[pos] < self.radices[pos] {
                self.current = Some(next);
                break;
            }
            next[pos] = 0;
        }
        Some(out)
    }
}

/// Enumerate every stratum for the given variables and mode.
///
/// Fails when a stratification variable is not a dataset column.
pub fn enumerate_strata(
    dataset: &Dataset,
    variables: &[String],
    mode: StratificationMode,
    drop_missing: bool,
) -> Result<Vec<StratumDescriptor>, ConfigError> {
    let mut strata = vec![StratumDescriptor::unstratified()];
    if variables.is_empty() {
        return Ok(strata);
    }

    let levels = variables
        .iter()
        .map(|name| {
            dataset
                .column(name)
                .map(|col| col.levels(drop_missing))
                .ok_or_else(|| ConfigError::UnknownColumn {
                    role: "stratification",
                    column: name.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    match mode {
        StratificationMode::Separate => {
            for (name, var_levels) in variables.iter().zip(&levels) {
                strata.extend(var_levels.iter().map(|level| StratumDescriptor {
                    family: name.clone(),
                    constraints: vec![(name.clone(), level.clone())],
                }));
            }
        }
        StratificationMode::Crossed => {
            let family = variables.join(CROSS_SEPARATOR);
            let radices = levels.iter().map(Vec::len).collect();
            strata.extend(Odometer::new(radices).map(|combo| StratumDescriptor {
                family: family.clone(),
                constraints: combo
                    .iter()
                    .enumerate()
                    .map(|(var, &idx)| (variables[var].clone(), levels[var][idx].clone()))
                    .collect(),
            }));
        }
    }

    Ok(strata)
}
