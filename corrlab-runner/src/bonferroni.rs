//! Bonferroni family-wise correction.
//!
//! Families are built from computed results only; undefined and failed
//! results never enter a family and never count towards `m`.
//!
//! - scope `both`: every computed result is one family
//! - scope `stratified_only`: unstratified results pass through unchanged,
//!   all stratified results form one family

use serde::{Deserialize, Serialize};

use crate::config::BonferroniScope;
use crate::engine::RawResult;

/// Corrected p-value: `min(1, p × m)`.
pub fn bonferroni(p: f64, m: usize) -> f64 {
    (p * m as f64).min(1.0)
}

/// A set of results corrected together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrectionFamily {
    pub label: String,
    /// Positions of the members in the raw result list.
    members: Vec<usize>,
}

impl CorrectionFamily {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            members: Vec::new(),
        }
    }

    pub fn add(&mut self, position: usize) {
        self.members.push(position);
    }

    /// Family size `m`.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Write corrected p-values for every member into `corrected`.
    fn apply(&self, results: &[RawResult], corrected: &mut [Option<f64>]) {
        let m = self.len();
        for &pos in &self.members {
            corrected[pos] = results[pos].p_value.map(|p| bonferroni(p, m));
        }
    }
}

/// Family sizes reported alongside the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySize {
    pub label: String,
    pub m: usize,
}

/// Corrected p-values aligned with the raw results.
#[derive(Debug, Clone, Default)]
pub struct Correction {
    /// `None` for results outside every family, or when correction is off.
    pub p_bonf: Vec<Option<f64>>,
    pub families: Vec<FamilySize>,
}

/// Partition computed results into families and correct them.
pub fn correct(results: &[RawResult], enabled: bool, scope: BonferroniScope) -> Correction {
    let mut p_bonf = vec![None; results.len()];
    if !enabled {
        return Correction {
            p_bonf,
            families: Vec::new(),
        };
    }

    let computed = results
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_computed() && r.p_value.is_some());

    let families = match scope {
        BonferroniScope::Both => {
            let mut all = CorrectionFamily::new("all");
            for (pos, _) in computed {
                all.add(pos);
            }
            vec![all]
        }
        BonferroniScope::StratifiedOnly => {
            let mut stratified = CorrectionFamily::new("stratified");
            for (pos, r) in computed {
                if r.unstratified {
                    // a family of one: p_bonf = p
                    p_bonf[pos] = r.p_value;
                } else {
                    stratified.add(pos);
                }
            }
            vec![stratified]
        }
    };

    for family in &families {
        family.apply(results, &mut p_bonf);
    }

    Correction {
        p_bonf,
        families: families
            .iter()
            .map(|f| FamilySize {
                label: f.label.clone(),
                m: f.len(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ResultStatus;
    use corrlab_core::{Alternative, Method};

    fn raw(stratum: usize, p: Option<f64>, status: ResultStatus) -> RawResult {
        RawResult {
            stratum_index: stratum,
            predictor_index: 0,
            unstratified: stratum == 0,
            predictor: "x".into(),
            outcome: "y".into(),
            method: Method::Pearson,
            directionality: Alternative::TwoSided,
            n_pairs: 10,
            estimate: p.map(|_| 0.5),
            p_value: p,
            tie_warning: false,
            status,
        }
    }

    fn batch() -> Vec<RawResult> {
        vec![
            raw(0, Some(0.01), ResultStatus::Computed),
            raw(0, Some(0.2), ResultStatus::Computed),
            raw(1, Some(0.03), ResultStatus::Computed),
            raw(1, None, ResultStatus::Undefined),
            raw(2, Some(0.5), ResultStatus::Computed),
            raw(2, None, ResultStatus::Failed("all.obs".into())),
        ]
    }

    #[test]
    fn bonferroni_caps_at_one() {
        assert!((bonferroni(0.01, 5) - 0.05).abs() < 1e-15);
        assert_eq!(bonferroni(0.3, 5), 1.0);
        assert_eq!(bonferroni(0.0, 100), 0.0);
    }

    #[test]
    fn off_means_no_correction() {
        let c = correct(&batch(), false, BonferroniScope::Both);
        assert!(c.p_bonf.iter().all(Option::is_none));
        assert!(c.families.is_empty());
    }

    #[test]
    fn both_scope_counts_every_computed_result() {
        let c = correct(&batch(), true, BonferroniScope::Both);
        assert_eq!(c.families, vec![FamilySize { label: "all".into(), m: 4 }]);
        assert!((c.p_bonf[0].unwrap() - 0.04).abs() < 1e-15);
        assert!((c.p_bonf[1].unwrap() - 0.8).abs() < 1e-15);
        assert!((c.p_bonf[2].unwrap() - 0.12).abs() < 1e-15);
        assert_eq!(c.p_bonf[3], None);
        assert_eq!(c.p_bonf[4], Some(1.0));
        assert_eq!(c.p_bonf[5], None);
    }

    #[test]
    fn stratified_only_passes_unstratified_through() {
        let c = correct(&batch(), true, BonferroniScope::StratifiedOnly);
        assert_eq!(c.families, vec![FamilySize { label: "stratified".into(), m: 2 }]);
        assert_eq!(c.p_bonf[0], Some(0.01));
        assert_eq!(c.p_bonf[1], Some(0.2));
        assert!((c.p_bonf[2].unwrap() - 0.06).abs() < 1e-15);
        assert_eq!(c.p_bonf[3], None);
        assert_eq!(c.p_bonf[4], Some(1.0));
    }

    #[test]
    fn empty_input_is_fine() {
        let c = correct(&[], true, BonferroniScope::Both);
        assert!(c.p_bonf.is_empty());
        assert_eq!(c.families[0].m, 0);
    }
}
