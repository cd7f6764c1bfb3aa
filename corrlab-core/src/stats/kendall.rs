//! Kendall's tau-b.
//!
//! Without ties and with n < 50 the p-value comes from the exact
//! permutation distribution of the number of concordant pairs. Otherwise the
//! normal approximation of S = C - D with the tie-corrected variance is used,
//! and ties that blocked the exact path raise the tie warning.

use super::distribution::normal_tails;
use super::rank::tie_groups;
use super::CorTest;
use crate::domain::{Alternative, Method};

/// Largest sample for which the exact distribution is used.
pub const EXACT_MAX_N: usize = 49;

/// Concordant and discordant pair counts. Pairs tied in either variable
/// count as neither.
fn pair_counts(x: &[f64], y: &[f64]) -> (f64, f64) {
    let n = x.len();
    let (mut concordant, mut discordant) = (0.0, 0.0);
    for i in 0..n {
        for j in (i + 1)..n {
            let s = (x[i] - x[j]).signum() * (y[i] - y[j]).signum();
            if x[i] == x[j] || y[i] == y[j] {
                continue;
            }
            if s > 0.0 {
                concordant += 1.0;
            } else {
                discordant += 1.0;
            }
        }
    }
    (concordant, discordant)
}

fn tie_pairs(groups: &[usize]) -> f64 {
    groups.iter().map(|&t| (t * (t - 1)) as f64 / 2.0).sum()
}

/// Number of permutations of `n` items with exactly `k` inversions, for
/// every `k` in `0..=n(n-1)/2`.
pub fn inversion_counts(n: usize) -> Vec<f64> {
    let mut counts = vec![1.0];
    for m in 2..=n {
        let len = counts.len() + m - 1;
        let mut prefix = vec![0.0; counts.len() + 1];
        for (i, c) in counts.iter().enumerate() {
            prefix[i + 1] = prefix[i] + c;
        }
        // next[k] = sum of counts[k - m + 1 ..= k]
        let next = (0..len)
            .map(|k| {
                let hi = k.min(counts.len() - 1) + 1;
                let lo = (k + 1).saturating_sub(m);
                if lo >= hi {
                    0.0
                } else {
                    prefix[hi] - prefix[lo]
                }
            })
            .collect();
        counts = next;
    }
    counts
}

/// Exact `(P(T <= q), P(T >= q))` for the concordant-pair count `q`.
fn exact_tails(q: usize, n: usize) -> (f64, f64) {
    let counts = inversion_counts(n);
    let total: f64 = counts.iter().sum();
    let lower: f64 = counts.iter().take(q + 1).sum::<f64>() / total;
    let upper: f64 = counts.iter().skip(q).sum::<f64>() / total;
    (lower.min(1.0), upper.min(1.0))
}

pub fn test(x: &[f64], y: &[f64], alternative: Alternative) -> CorTest {
    let n = x.len();
    let nf = n as f64;
    let x_ties = tie_groups(x);
    let y_ties = tie_groups(y);

    let t0 = nf * (nf - 1.0) / 2.0;
    let t1 = tie_pairs(&x_ties);
    let t2 = tie_pairs(&y_ties);
    let denom = ((t0 - t1) * (t0 - t2)).sqrt();
    if denom <= 0.0 {
        return CorTest::undefined(Method::Kendall, alternative, n);
    }

    let (concordant, discordant) = pair_counts(x, y);
    let s = concordant - discordant;
    let tau = (s / denom).clamp(-1.0, 1.0);
    let ties = !x_ties.is_empty() || !y_ties.is_empty();

    if n <= EXACT_MAX_N && !ties {
        let q = concordant.round() as usize;
        let (lower, upper) = exact_tails(q, n);
        return CorTest {
            method: Method::Kendall,
            alternative,
            n_pairs: n,
            estimate: Some(tau),
            statistic: Some(q as f64),
            p_value: Some(alternative.p_value(lower, upper)),
            exact: true,
            tie_warning: false,
        };
    }

    let sum_over = |groups: &[usize], f: &dyn Fn(f64) -> f64| -> f64 {
        groups.iter().map(|&t| f(t as f64)).sum()
    };
    let v0 = nf * (nf - 1.0) * (2.0 * nf + 5.0);
    let vt = sum_over(&x_ties, &|t| t * (t - 1.0) * (2.0 * t + 5.0));
    let vu = sum_over(&y_ties, &|t| t * (t - 1.0) * (2.0 * t + 5.0));
    let v1 = sum_over(&x_ties, &|t| t * (t - 1.0)) * sum_over(&y_ties, &|t| t * (t - 1.0));
    let v2 = sum_over(&x_ties, &|t| t * (t - 1.0) * (t - 2.0))
        * sum_over(&y_ties, &|t| t * (t - 1.0) * (t - 2.0));
    let var_s = (v0 - vt - vu) / 18.0
        + v1 / (2.0 * nf * (nf - 1.0))
        + v2 / (9.0 * nf * (nf - 1.0) * (nf - 2.0));

    if var_s <= 0.0 {
        return CorTest::undefined(Method::Kendall, alternative, n);
    }
    let z = s / var_s.sqrt();
    let p_value = normal_tails(z).map(|(lower, upper)| alternative.p_value(lower, upper));

    CorTest {
        method: Method::Kendall,
        alternative,
        n_pairs: n,
        estimate: Some(tau),
        statistic: Some(z),
        p_value,
        exact: false,
        tie_warning: ties && n <= EXACT_MAX_N,
    }
}
