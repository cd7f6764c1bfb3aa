//! Golden test: fixed expected values on the frozen mtcars table.
//!
//! Locks the unstratified battery: row count, order, pair counts, estimates,
//! p-values and Bonferroni factors. If this test fails the statistics changed;
//! investigate before updating.

mod common;

use common::{assert_close, config, mtcars, row};
use corrlab_core::{Level, Method};
use corrlab_runner::{run_correlations, CorrelationConfig};

#[test]
fn five_predictors_unstratified() {
    let ds = mtcars();
    let table =
        run_correlations(&ds, &config(&["disp", "hp", "drat", "wt", "qsec"])).unwrap();

    assert_eq!(table.len(), 5);
    assert!(table.strata_columns.is_empty());
    assert!(table
        .rows
        .iter()
        .all(|r| r.stratification_family == "unstratified" && r.outcome == "mpg"));
    let order: Vec<&str> = table.rows.iter().map(|r| r.predictor.as_str()).collect();
    assert_eq!(order, vec!["disp", "hp", "drat", "wt", "qsec"]);

    let disp = &table.rows[0];
    assert_eq!(disp.n_pair, 32);
    assert_eq!(disp.method, Method::Pearson);
    assert_close(disp.cor, -0.8475514, 1e-6);
    assert_close(disp.p_value, 9.380327e-10, 1e-4);
    // five tests in the family
    assert_close(disp.p_bonf.unwrap(), 4.690164e-09, 1e-4);
    assert!(!disp.tie_warning);

    for r in &table.rows {
        assert_close(r.p_bonf.unwrap(), (r.p_value * 5.0).min(1.0), 1e-12);
    }
    assert_eq!(table.summary.families[0].m, 5);
}

#[test]
fn method_override_applies_to_one_predictor() {
    let ds = mtcars();
    let mut cfg = config(&["disp", "carb"]);
    cfg.method_map.insert("carb".into(), Method::Spearman);
    let table = run_correlations(&ds, &cfg).unwrap();

    let disp = row(&table.rows, "unstratified", "disp");
    let carb = row(&table.rows, "unstratified", "carb");
    assert_eq!(disp.method, Method::Pearson);
    assert_eq!(carb.method, Method::Spearman);
    // carb and mpg both carry ties
    assert!(carb.tie_warning);
    assert!(carb.cor < 0.0);
}

#[test]
fn pattern_selection_skips_the_outcome() {
    let ds = mtcars();
    let mut cfg = config(&["qsec", "wt"]);
    cfg.outcome = "qsec".into();
    cfg.predictors = vec!["where(is.numeric)".into()];
    let table = run_correlations(&ds, &cfg).unwrap();
    assert_eq!(table.len(), 10);
    assert!(table.rows.iter().all(|r| r.predictor != "qsec"));
}

#[test]
fn explicit_self_correlation_is_one() {
    let ds = mtcars();
    for method in Method::ALL {
        let mut cfg = config(&["mpg"]);
        cfg.method = method;
        let table = run_correlations(&ds, &cfg).unwrap();
        assert_eq!(table.len(), 1, "{method}");
        let r = &table.rows[0];
        assert_eq!(r.predictor, "mpg");
        assert!((r.cor - 1.0).abs() < 1e-12, "{method}: {}", r.cor);
        assert_eq!(r.n_pair, 32);
    }
}

#[test]
fn correction_off_drops_the_column() {
    let ds = mtcars();
    let mut cfg = config(&["disp", "hp"]);
    cfg.bonferroni_correct = false;
    let table = run_correlations(&ds, &cfg).unwrap();
    assert!(table.rows.iter().all(|r| r.p_bonf.is_none()));
    assert!(!table.column_names().contains(&"p_bonf".to_string()));
    assert!(table.summary.families.is_empty());
}

#[test]
fn selection_expressions_resolve_before_running() {
    let ds = mtcars();
    let table = run_correlations(&ds, &config(&["disp:wt", "-drat"])).unwrap();
    let order: Vec<&str> = table.rows.iter().map(|r| r.predictor.as_str()).collect();
    assert_eq!(order, vec!["disp", "hp", "wt"]);

    let everything = run_correlations(&ds, &config(&["where(is.numeric)"])).unwrap();
    // 10 numeric columns besides mpg
    assert_eq!(everything.len(), 10);
}

#[test]
fn toml_config_reproduces_programmatic_run() {
    let ds = mtcars();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("battery.toml");
    std::fs::write(
        &path,
        r#"
outcome = "mpg"
predictors = ["disp", "hp", "drat", "wt", "qsec"]
"#,
    )
    .unwrap();

    let from_file = CorrelationConfig::from_file(&path).unwrap();
    let programmatic = config(&["disp", "hp", "drat", "wt", "qsec"]);
    assert_eq!(from_file.config_hash(), programmatic.config_hash());
    assert_eq!(
        run_correlations(&ds, &from_file).unwrap(),
        run_correlations(&ds, &programmatic).unwrap()
    );
}

#[test]
fn all_obs_on_complete_data_matches_default() {
    let ds = mtcars();
    let mut cfg = config(&["disp"]);
    cfg.missing = corrlab_core::MissingPolicy::AllObs;
    let table = run_correlations(&ds, &cfg).unwrap();
    assert_close(table.rows[0].cor, -0.8475514, 1e-6);
    assert_eq!(table.rows[0].strata, Vec::<Level>::new());
}
