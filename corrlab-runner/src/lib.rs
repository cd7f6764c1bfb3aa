//! CorrLab Runner: stratified correlation batteries over a `Dataset`.
//!
//! This crate builds on `corrlab-core` to provide:
//! - Serializable run configuration with TOML loading and hashing
//! - Per-predictor method / directionality resolution
//! - Stratum enumeration (separate and crossed) and viability filtering
//! - The parallel correlation engine
//! - Bonferroni correction under two family scopes
//! - Result assembly and CSV / JSON / Markdown export

pub mod assemble;
pub mod bonferroni;
pub mod config;
pub mod engine;
pub mod export;
pub mod filter;
pub mod runner;
pub mod strata;
pub mod variables;

pub use assemble::{ResultRow, ResultTable, RunSummary};
pub use bonferroni::{bonferroni, correct, Correction, CorrectionFamily, FamilySize};
pub use config::{BonferroniScope, ConfigError, ConfigHash, CorrelationConfig, StratificationMode};
pub use engine::{CorrelationEngine, RawResult, ResultStatus};
pub use export::{export_csv, export_json, generate_report, RunReport, SCHEMA_VERSION};
pub use filter::{filter_viable, ViableStratum, MIN_STRATUM_ROWS};
pub use runner::{resolve_plan, run_correlations, ResolvedPlan, RunError};
pub use strata::{enumerate_strata, StratumDescriptor, CROSS_SEPARATOR, UNSTRATIFIED};
pub use variables::{parse_override_map, resolve_predictor_specs, PredictorSpec};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<CorrelationConfig>();
        assert_sync::<CorrelationConfig>();
        assert_send::<PredictorSpec>();
        assert_sync::<PredictorSpec>();
        assert_send::<ConfigError>();
        assert_sync::<ConfigError>();
    }

    #[test]
    fn batch_types_are_send_sync() {
        assert_send::<StratumDescriptor>();
        assert_sync::<StratumDescriptor>();
        assert_send::<ViableStratum>();
        assert_sync::<ViableStratum>();
        assert_send::<RawResult>();
        assert_sync::<RawResult>();
        assert_send::<CorrelationEngine<'static>>();
        assert_sync::<CorrelationEngine<'static>>();
    }

    #[test]
    fn result_types_are_send_sync() {
        assert_send::<ResultTable>();
        assert_sync::<ResultTable>();
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
