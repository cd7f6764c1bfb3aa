//! Per-predictor test configuration.
//!
//! Each predictor gets the override from the relevant map when its name is a
//! key there, otherwise the default. Override keys that name no resolved
//! predictor are configuration errors.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use corrlab_core::{Alternative, Method, ParseEnumError};

use crate::config::ConfigError;

/// Effective test settings of one predictor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictorSpec {
    pub name: String,
    pub method: Method,
    pub directionality: Alternative,
}

fn check_override_keys<T>(
    field: &str,
    map: &BTreeMap<String, T>,
    predictors: &[String],
) -> Result<(), ConfigError> {
    match map.keys().find(|k| !predictors.contains(k)) {
        Some(key) => Err(ConfigError::UnknownOverride {
            field: field.to_string(),
            predictor: key.clone(),
        }),
        None => Ok(()),
    }
}

/// Resolve method and directionality for every predictor, in input order.
pub fn resolve_predictor_specs(
    predictors: &[String],
    default_method: Method,
    method_map: &BTreeMap<String, Method>,
    default_directionality: Alternative,
    directionality_map: &BTreeMap<String, Alternative>,
) -> Result<Vec<PredictorSpec>, ConfigError> {
    check_override_keys("method_map", method_map, predictors)?;
    check_override_keys("directionality_map", directionality_map, predictors)?;

    Ok(predictors
        .iter()
        .map(|name| PredictorSpec {
            name: name.clone(),
            method: method_map.get(name).copied().unwrap_or(default_method),
            directionality: directionality_map
                .get(name)
                .copied()
                .unwrap_or(default_directionality),
        })
        .collect())
}

/// Parse a `name=value,name=value` override list.
///
/// Values go through `FromStr`, so misspelled enum values are reported with
/// the field they came from.
pub fn parse_override_map<T>(field: &str, input: &str) -> Result<BTreeMap<String, T>, ConfigError>
where
    T: FromStr<Err = ParseEnumError>,
{
    let mut map = BTreeMap::new();
    for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, value) = entry
            .split_once('=')
            .map(|(n, v)| (n.trim(), v.trim()))
            .filter(|(n, v)| !n.is_empty() && !v.is_empty())
            .ok_or_else(|| ConfigError::MalformedOverride {
                field: field.to_string(),
                entry: entry.to_string(),
            })?;
        let parsed = value
            .parse::<T>()
            .map_err(|e| ConfigError::invalid(format!("{field}.{name}"), e))?;
        map.insert(name.to_string(), parsed);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let specs = resolve_predictor_specs(
            &names(&["disp", "hp"]),
            Method::Pearson,
            &BTreeMap::new(),
            Alternative::TwoSided,
            &BTreeMap::new(),
        )
        .unwrap();
        assert_eq!(specs.len(), 2);
        assert!(specs
            .iter()
            .all(|s| s.method == Method::Pearson && s.directionality == Alternative::TwoSided));
        assert_eq!(specs[0].name, "disp");
        assert_eq!(specs[1].name, "hp");
    }

    #[test]
    fn overrides_take_precedence() {
        let methods = BTreeMap::from([("carb".to_string(), Method::Spearman)]);
        let dirs = BTreeMap::from([("disp".to_string(), Alternative::Less)]);
        let specs = resolve_predictor_specs(
            &names(&["disp", "carb"]),
            Method::Pearson,
            &methods,
            Alternative::TwoSided,
            &dirs,
        )
        .unwrap();
        assert_eq!(specs[0].method, Method::Pearson);
        assert_eq!(specs[0].directionality, Alternative::Less);
        assert_eq!(specs[1].method, Method::Spearman);
        assert_eq!(specs[1].directionality, Alternative::TwoSided);
    }

    #[test]
    fn override_for_unknown_predictor_fails() {
        let methods = BTreeMap::from([("wt".to_string(), Method::Kendall)]);
        let err = resolve_predictor_specs(
            &names(&["disp"]),
            Method::Pearson,
            &methods,
            Alternative::TwoSided,
            &BTreeMap::new(),
        )
        .unwrap_err();
        match err {
            ConfigError::UnknownOverride { field, predictor } => {
                assert_eq!(field, "method_map");
                assert_eq!(predictor, "wt");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn override_list_parses() {
        let map: BTreeMap<String, Method> =
            parse_override_map("method_map", "carb=spearman, hp = kendall").unwrap();
        assert_eq!(map["carb"], Method::Spearman);
        assert_eq!(map["hp"], Method::Kendall);
        let empty: BTreeMap<String, Method> = parse_override_map("method_map", "").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn override_list_reports_field_and_value() {
        let err = parse_override_map::<Alternative>("directionality_map", "hp=up").unwrap_err();
        match err {
            ConfigError::InvalidValue { field, value, .. } => {
                assert_eq!(field, "directionality_map.hp");
                assert_eq!(value, "up");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            parse_override_map::<Method>("method_map", "carb"),
            Err(ConfigError::MalformedOverride { .. })
        ));
    }
}
