//! Serializable correlation-battery configuration.
//!
//! A `CorrelationConfig` captures everything needed to reproduce a run:
//! - Outcome column and predictor / stratification selection expressions
//! - Stratification mode and missing-stratum handling
//! - Default method and directionality, with per-predictor overrides
//! - Missing-data policy for the pairwise tests
//! - Bonferroni switch and scope
//!
//! Configs load from TOML; unknown keys and misspelled enum values are
//! rejected before any computation starts.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use corrlab_core::data::SelectError;
use corrlab_core::{Alternative, Method, MissingPolicy, ParseEnumError};

/// Content-addressable identifier of a configuration.
pub type ConfigHash = String;

/// Errors that fail an invocation before any test is computed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for '{field}' (expected one of: {expected})")]
    InvalidValue {
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("'{field}' overrides '{predictor}', which is not among the resolved predictors")]
    UnknownOverride { field: String, predictor: String },

    #[error("malformed entry '{entry}' in '{field}' (expected name=value)")]
    MalformedOverride { field: String, entry: String },

    #[error("{role} column '{column}' not found in dataset")]
    UnknownColumn { role: &'static str, column: String },

    #[error("{role} column '{column}' is not numeric")]
    NotNumeric { role: &'static str, column: String },

    #[error("predictor selection resolved to no columns")]
    EmptyPredictors,

    #[error("'{field}': {source}")]
    Selection {
        field: &'static str,
        #[source]
        source: SelectError,
    },

    #[error("read config '{path}': {reason}")]
    Read { path: String, reason: String },

    #[error("parse config TOML: {0}")]
    Parse(String),
}

impl ConfigError {
    /// Attach the config field name to an enum parse failure.
    pub fn invalid(field: impl Into<String>, err: ParseEnumError) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            value: err.value,
            expected: err.expected,
        }
    }
}

/// How multiple stratification variables combine into strata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StratificationMode {
    /// One stratum per level of each variable independently.
    #[default]
    Separate,
    /// One stratum per combination of levels across all variables.
    Crossed,
}

impl StratificationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StratificationMode::Separate => "separate",
            StratificationMode::Crossed => "crossed",
        }
    }
}

impl fmt::Display for StratificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StratificationMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "separate" => Ok(StratificationMode::Separate),
            "crossed" => Ok(StratificationMode::Crossed),
            other => Err(ParseEnumError {
                kind: "stratification mode",
                value: other.to_string(),
                expected: "separate, crossed",
            }),
        }
    }
}

/// Which results share a Bonferroni family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonferroniScope {
    /// Every computed test, stratified or not, is one family.
    #[default]
    Both,
    /// Only stratified tests are corrected; unstratified p-values pass through.
    StratifiedOnly,
}

impl BonferroniScope {
    pub fn as_str(self) -> &'static str {
        match self {
            BonferroniScope::Both => "both",
            BonferroniScope::StratifiedOnly => "stratified_only",
        }
    }
}

impl fmt::Display for BonferroniScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BonferroniScope {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "both" => Ok(BonferroniScope::Both),
            "stratified_only" => Ok(BonferroniScope::StratifiedOnly),
            other => Err(ParseEnumError {
                kind: "bonferroni scope",
                value: other.to_string(),
                expected: "both, stratified_only",
            }),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Full configuration of one correlation battery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CorrelationConfig {
    /// Outcome column every predictor is correlated with.
    pub outcome: String,

    /// Predictor selection expressions, applied left to right.
    pub predictors: Vec<String>,

    /// Stratification selection expressions (empty = unstratified only).
    #[serde(default)]
    pub stratification_vars: Vec<String>,

    #[serde(default)]
    pub stratification_mode: StratificationMode,

    /// Default correlation method.
    #[serde(default)]
    pub method: Method,

    /// Per-predictor method overrides.
    #[serde(default)]
    pub method_map: BTreeMap<String, Method>,

    /// Default alternative hypothesis.
    #[serde(default)]
    pub directionality: Alternative,

    /// Per-predictor alternative overrides.
    #[serde(default)]
    pub directionality_map: BTreeMap<String, Alternative>,

    /// Missing-data policy for every test.
    #[serde(default)]
    pub missing: MissingPolicy,

    #[serde(default = "default_true")]
    pub bonferroni_correct: bool,

    #[serde(default)]
    pub bonferroni_scope: BonferroniScope,

    /// Rows with a missing stratification value belong to no stratum.
    #[serde(default = "default_true")]
    pub drop_missing_strata: bool,

    /// Raise skip / undefined diagnostics from debug to info.
    #[serde(default)]
    pub verbose: bool,

    /// Evaluate tests on the rayon pool.
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl CorrelationConfig {
    /// A config with every optional field at its default.
    pub fn new(outcome: impl Into<String>, predictors: &[&str]) -> Self {
        Self {
            outcome: outcome.into(),
            predictors: predictors.iter().map(|p| p.to_string()).collect(),
            stratification_vars: Vec::new(),
            stratification_mode: StratificationMode::default(),
            method: Method::default(),
            method_map: BTreeMap::new(),
            directionality: Alternative::default(),
            directionality_map: BTreeMap::new(),
            missing: MissingPolicy::default(),
            bonferroni_correct: true,
            bonferroni_scope: BonferroniScope::default(),
            drop_missing_strata: true,
            verbose: false,
            parallel: true,
        }
    }

    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Deterministic BLAKE3 hash of the canonical JSON form.
    ///
    /// Two runs over the same dataset with equal hashes produce identical
    /// tables. Override maps are ordered, so key order in the source file
    /// does not matter.
    pub fn config_hash(&self) -> ConfigHash {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
