//! Stratification levels: the observed values of a grouping column.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// One observed value of a stratification variable.
///
/// Ordering is total: numbers ascending (IEEE total order), then text
/// ascending, then `Missing` last. Stratum enumeration relies on this order.
#[derive(Debug, Clone)]
pub enum Level {
    Number(f64),
    Text(String),
    Missing,
}

impl Level {
    pub fn is_missing(&self) -> bool {
        matches!(self, Level::Missing)
    }

    fn rank(&self) -> u8 {
        match self {
            Level::Number(_) => 0,
            Level::Text(_) => 1,
            Level::Missing => 2,
        }
    }
}

impl PartialEq for Level {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Level {}

impl PartialOrd for Level {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Level {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Level::Number(a), Level::Number(b)) if a == b => Ordering::Equal,
            (Level::Number(a), Level::Number(b)) => a.total_cmp(b),
            (Level::Text(a), Level::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Number(v) => f.write_str(&format_number(*v)),
            Level::Text(s) => f.write_str(s),
            Level::Missing => f.write_str("NA"),
        }
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Level::Number(v) => serializer.serialize_f64(*v),
            Level::Text(s) => serializer.serialize_str(s),
            Level::Missing => serializer.serialize_none(),
        }
    }
}

/// Integral values print without a fractional part (`4`, not `4.0`).
pub fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
