//! Column selection expressions.
//!
//! A small tidyselect-style language for naming predictor and
//! stratification columns:
//!
//! | Expression          | Selects                                   |
//! |---------------------|-------------------------------------------|
//! | `name`              | the column `name`                         |
//! | `a:b`               | `a` through `b` in dataset order          |
//! | `starts_with(p)`    | names starting with `p`                   |
//! | `ends_with(s)`      | names ending with `s`                     |
//! | `contains(s)`       | names containing `s`                      |
//! | `everything()`      | every column                              |
//! | `where(is.numeric)` | every numeric column                      |
//! | `-expr`             | removes what `expr` selects               |
//!
//! Expressions are applied left to right. A leading exclusion starts from
//! every column. The result keeps first-selection order with no duplicates.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::dataset::Dataset;

/// Errors from parsing or resolving selection expressions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("malformed selection expression '{0}'")]
    Malformed(String),

    #[error("range '{start}:{end}' runs backwards")]
    BackwardsRange { start: String, end: String },
}

/// A parsed selection expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Name(String),
    Range(String, String),
    StartsWith(String),
    EndsWith(String),
    Contains(String),
    Everything,
    Numeric,
    Exclude(Box<Selector>),
}

impl Selector {
    /// Column indices this selector picks, in dataset order.
    ///
    /// An exclusion resolves to what it excludes; the caller decides how
    /// to apply it.
    fn indices(&self, dataset: &Dataset) -> Result<Vec<usize>, SelectError> {
        let names = dataset.column_names();
        let position = |name: &str| {
            names
                .iter()
                .position(|n| *n == name)
                .ok_or_else(|| SelectError::UnknownColumn(name.to_string()))
        };
        let matching = |pred: &dyn Fn(&str) -> bool| {
            names
                .iter()
                .enumerate()
                .filter(|(_, n)| pred(**n))
                .map(|(i, _)| i)
                .collect::<Vec<_>>()
        };

        Ok(match self {
            Selector::Name(name) => vec![position(name)?],
            Selector::Range(start, end) => {
                let (a, b) = (position(start)?, position(end)?);
                if a > b {
                    return Err(SelectError::BackwardsRange {
                        start: start.clone(),
                        end: end.clone(),
                    });
                }
                (a..=b).collect()
            }
            Selector::StartsWith(p) => matching(&|n: &str| n.starts_with(p.as_str())),
            Selector::EndsWith(s) => matching(&|n: &str| n.ends_with(s.as_str())),
            Selector::Contains(s) => matching(&|n: &str| n.contains(s.as_str())),
            Selector::Everything => (0..names.len()).collect(),
            Selector::Numeric => dataset
                .columns()
                .iter()
                .enumerate()
                .filter(|(_, c)| c.is_numeric())
                .map(|(i, _)| i)
                .collect(),
            Selector::Exclude(inner) => inner.indices(dataset)?,
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Name(n) => write!(f, "{n}"),
            Selector::Range(a, b) => write!(f, "{a}:{b}"),
            Selector::StartsWith(p) => write!(f, "starts_with({p})"),
            Selector::EndsWith(s) => write!(f, "ends_with({s})"),
            Selector::Contains(s) => write!(f, "contains({s})"),
            Selector::Everything => f.write_str("everything()"),
            Selector::Numeric => f.write_str("where(is.numeric)"),
            Selector::Exclude(inner) => write!(f, "-{inner}"),
        }
    }
}

impl FromStr for Selector {
    type Err = SelectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expr = s.trim();
        let malformed = || SelectError::Malformed(s.to_string());

        if expr.is_empty() {
            return Err(malformed());
        }
        if let Some(rest) = expr.strip_prefix('-').or_else(|| expr.strip_prefix('!')) {
            return Ok(Selector::Exclude(Box::new(rest.parse()?)));
        }

        if let Some(open) = expr.find('(') {
            let inner = expr[open + 1..]
                .strip_suffix(')')
                .ok_or_else(malformed)?
                .trim()
                .trim_matches('"')
                .trim_matches('\'');
            return match &expr[..open] {
                "starts_with" if !inner.is_empty() => Ok(Selector::StartsWith(inner.to_string())),
                "ends_with" if !inner.is_empty() => Ok(Selector::EndsWith(inner.to_string())),
                "contains" if !inner.is_empty() => Ok(Selector::Contains(inner.to_string())),
                "everything" if inner.is_empty() => Ok(Selector::Everything),
                "where" if inner == "is.numeric" => Ok(Selector::Numeric),
                _ => Err(malformed()),
            };
        }

        if let Some((a, b)) = expr.split_once(':') {
            let (a, b) = (a.trim(), b.trim());
            if a.is_empty() || b.is_empty() {
                return Err(malformed());
            }
            return Ok(Selector::Range(a.to_string(), b.to_string()));
        }

        Ok(Selector::Name(expr.to_string()))
    }
}

/// Resolve selection expressions into an ordered, de-duplicated list of
/// column names.
pub fn resolve_columns<S: AsRef<str>>(
    expressions: &[S],
    dataset: &Dataset,
) -> Result<Vec<String>, SelectError> {
    let selectors = expressions
        .iter()
        .map(|e| e.as_ref().parse::<Selector>())
        .collect::<Result<Vec<_>, _>>()?;

    let mut selected: Vec<usize> = match selectors.first() {
        Some(Selector::Exclude(_)) => (0..dataset.n_columns()).collect(),
        _ => Vec::new(),
    };

    for selector in &selectors {
        let picked = selector.indices(dataset)?;
        if matches!(selector, Selector::Exclude(_)) {
            selected.retain(|i| !picked.contains(i));
        } else {
            for i in picked {
                if !selected.contains(&i) {
                    selected.push(i);
                }
            }
        }
    }

    let names = dataset.column_names();
    Ok(selected.into_iter().map(|i| names[i].to_string()).collect())
}
