//! Test-configuration enums shared by every layer.
//!
//! String forms follow the conventional spellings used by statistical
//! software (`two.sided`, `pairwise.complete.obs`, ...) so that configs and
//! exported tables stay readable next to other tools' output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A string that does not name a member of one of the enums below.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Correlation coefficient to test.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    #[default]
    Pearson,
    Kendall,
    Spearman,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::Pearson, Method::Kendall, Method::Spearman];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Pearson => "pearson",
            Method::Kendall => "kendall",
            Method::Spearman => "spearman",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pearson" => Ok(Method::Pearson),
            "kendall" => Ok(Method::Kendall),
            "spearman" => Ok(Method::Spearman),
            other => Err(ParseEnumError {
                kind: "method",
                value: other.to_string(),
                expected: "pearson, kendall, spearman",
            }),
        }
    }
}

/// Alternative hypothesis ("directionality") of a correlation test.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Alternative {
    #[default]
    #[serde(rename = "two.sided")]
    TwoSided,
    #[serde(rename = "less")]
    Less,
    #[serde(rename = "greater")]
    Greater,
}

impl Alternative {
    pub fn as_str(self) -> &'static str {
        match self {
            Alternative::TwoSided => "two.sided",
            Alternative::Less => "less",
            Alternative::Greater => "greater",
        }
    }

    /// Combine the two tail probabilities of a statistic into a p-value.
    ///
    /// `lower` is P(T <= t), `upper` is P(T >= t).
    pub fn p_value(self, lower: f64, upper: f64) -> f64 {
        match self {
            Alternative::Less => lower,
            Alternative::Greater => upper,
            Alternative::TwoSided => (2.0 * lower.min(upper)).min(1.0),
        }
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Alternative {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "two.sided" => Ok(Alternative::TwoSided),
            "less" => Ok(Alternative::Less),
            "greater" => Ok(Alternative::Greater),
            other => Err(ParseEnumError {
                kind: "directionality",
                value: other.to_string(),
                expected: "two.sided, less, greater",
            }),
        }
    }
}

/// How missing values are handled when correlating a pair of columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissingPolicy {
    /// Any missing value makes the statistic undefined.
    #[default]
    #[serde(rename = "everything")]
    Everything,
    /// Missing values are an error.
    #[serde(rename = "all.obs")]
    AllObs,
    /// Drop rows missing on x or y; no complete pair is an error.
    #[serde(rename = "complete.obs")]
    CompleteObs,
    /// Drop rows missing on x or y; no complete pair is undefined rather
    /// than an error.
    #[serde(rename = "na.or.complete")]
    NaOrComplete,
    /// Per-pair deletion.
    #[serde(rename = "pairwise.complete.obs")]
    PairwiseCompleteObs,
}

impl MissingPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            MissingPolicy::Everything => "everything",
            MissingPolicy::AllObs => "all.obs",
            MissingPolicy::CompleteObs => "complete.obs",
            MissingPolicy::NaOrComplete => "na.or.complete",
            MissingPolicy::PairwiseCompleteObs => "pairwise.complete.obs",
        }
    }
}

impl fmt::Display for MissingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingPolicy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "everything" => Ok(MissingPolicy::Everything),
            "all.obs" => Ok(MissingPolicy::AllObs),
            "complete.obs" => Ok(MissingPolicy::CompleteObs),
            "na.or.complete" => Ok(MissingPolicy::NaOrComplete),
            "pairwise.complete.obs" => Ok(MissingPolicy::PairwiseCompleteObs),
            other => Err(ParseEnumError {
                kind: "missing-data policy",
                value: other.to_string(),
                expected: "everything, all.obs, complete.obs, na.or.complete, pairwise.complete.obs",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_round_trips_through_strings() {
        for m in Method::ALL {
            assert_eq!(m.as_str().parse::<Method>().unwrap(), m);
        }
    }

    #[test]
    fn method_rejects_unknown() {
        let err = "pearsons".parse::<Method>().unwrap_err();
        assert_eq!(err.kind, "method");
        assert_eq!(err.value, "pearsons");
    }

    #[test]
    fn alternative_uses_dotted_names() {
        assert_eq!("two.sided".parse::<Alternative>().unwrap(), Alternative::TwoSided);
        assert!("two_sided".parse::<Alternative>().is_err());
        let json = serde_json::to_string(&Alternative::TwoSided).unwrap();
        assert_eq!(json, "\"two.sided\"");
    }

    #[test]
    fn two_sided_doubles_the_smaller_tail() {
        assert!((Alternative::TwoSided.p_value(0.01, 0.99) - 0.02).abs() < 1e-15);
        assert_eq!(Alternative::TwoSided.p_value(0.7, 0.6), 1.0);
        assert_eq!(Alternative::Less.p_value(0.01, 0.99), 0.01);
        assert_eq!(Alternative::Greater.p_value(0.01, 0.99), 0.99);
    }

    #[test]
    fn missing_policy_uses_dotted_names() {
        assert_eq!(MissingPolicy::NaOrComplete.to_string(), "na.or.complete");
        assert_eq!(
            "pairwise.complete.obs".parse::<MissingPolicy>().unwrap(),
            MissingPolicy::PairwiseCompleteObs
        );
    }
}
