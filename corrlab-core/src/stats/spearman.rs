//! Spearman's rank correlation.
//!
//! The test statistic is S = sum of squared rank differences. Without ties
//! and with n < 1290 the p-value is exact: full enumeration for n <= 9 and
//! the AS 89 Edgeworth series beyond. With ties (or larger n) the t
//! approximation on n - 2 df is used.

use super::distribution::{normal_upper, t_tails};
use super::pearson;
use super::rank::{average_ranks, has_ties};
use super::CorTest;
use crate::domain::{Alternative, Method};

/// Largest sample for which the exact distribution is used.
pub const EXACT_MAX_N: usize = 1289;

/// Samples up to this size are enumerated permutation by permutation.
const ENUMERATE_MAX_N: usize = 9;

/// Rearranges `perm` into the next lexicographic permutation.
/// Returns `false` once the last permutation has been passed.
fn next_permutation(perm: &mut [usize]) -> bool {
    let n = perm.len();
    if n < 2 {
        return false;
    }
    let mut i = n - 1;
    while i > 0 && perm[i - 1] >= perm[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = n - 1;
    while perm[j] <= perm[i - 1] {
        j -= 1;
    }
    perm.swap(i - 1, j);
    perm[i..].reverse();
    true
}

/// P(S >= is) for `lower_tail = false`, P(S < is) for `lower_tail = true`,
/// where S is Spearman's statistic under independence (AS 89).
pub fn prho(n: usize, is: f64, lower_tail: bool) -> f64 {
    let pv = if lower_tail { 0.0 } else { 1.0 };
    if n <= 1 || is <= 0.0 {
        return pv;
    }
    let nf = n as f64;
    let n3 = nf * (nf * nf - 1.0) / 3.0;
    if is > n3 {
        return 1.0 - pv;
    }

    if n <= ENUMERATE_MAX_N {
        let mut perm: Vec<usize> = (0..n).collect();
        let (mut total, mut at_least) = (0u64, 0u64);
        loop {
            let s: usize = perm
                .iter()
                .enumerate()
                .map(|(i, &p)| i.abs_diff(p).pow(2))
                .sum();
            total += 1;
            if s as f64 >= is {
                at_least += 1;
            }
            if !next_permutation(&mut perm) {
                break;
            }
        }
        let upper = at_least as f64 / total as f64;
        return if lower_tail { 1.0 - upper } else { upper };
    }

    // Edgeworth series expansion
    const C: [f64; 12] = [
        0.2274, 0.2531, 0.1745, 0.0758, 0.1033, 0.3932, 0.0879, 0.0151, 0.0072, 0.0831, 0.0131,
        4.6e-4,
    ];
    let mut js = is.round();
    if js % 2.0 != 0.0 {
        js += 1.0;
    }
    let b = 1.0 / nf;
    let x = (6.0 * (js - 1.0) * b / (nf * nf - 1.0) - 1.0) * (1.0 / b - 1.0).sqrt();
    let mut y = x * x;
    let u = x
        * b
        * (C[0]
            + b * (C[1] + C[2] * b)
            + y * (-C[3] + b * (C[4] + C[5] * b)
                - y * b
                    * (C[6] + C[7] * b
                        - y * (C[8] - C[9] * b + y * b * (C[10] - C[11] * y)))));
    y = u / (y / 2.0).exp();
    let upper = (y + normal_upper(x)).clamp(0.0, 1.0);
    if lower_tail {
        1.0 - upper
    } else {
        upper
    }
}

pub fn test(x: &[f64], y: &[f64], alternative: Alternative) -> CorTest {
    let n = x.len();
    let nf = n as f64;
    let rx = average_ranks(x);
    let ry = average_ranks(y);
    let Some(rho) = pearson::coefficient(&rx, &ry) else {
        return CorTest::undefined(Method::Spearman, alternative, n);
    };

    let ties = has_ties(x) || has_ties(y);
    let s_stat = (nf * nf * nf - nf) * (1.0 - rho) / 6.0;

    if n <= EXACT_MAX_N && !ties {
        // S is an even integer without ties
        let q: f64 = rx.iter().zip(&ry).map(|(a, b)| (a - b).powi(2)).sum::<f64>().round();
        // small S ↔ positive association
        let p_small_s = prho(n, q + 2.0, true);
        let p_large_s = prho(n, q, false);
        return CorTest {
            method: Method::Spearman,
            alternative,
            n_pairs: n,
            estimate: Some(rho),
            statistic: Some(q),
            p_value: Some(alternative.p_value(p_large_s, p_small_s)),
            exact: true,
            tie_warning: false,
        };
    }

    let t = if rho.abs() >= 1.0 {
        rho.signum() * f64::INFINITY
    } else {
        rho / ((1.0 - rho * rho) / (nf - 2.0)).sqrt()
    };
    let p_value = t_tails(t, nf - 2.0).map(|(lower, upper)| alternative.p_value(lower, upper));

    CorTest {
        method: Method::Spearman,
        alternative,
        n_pairs: n,
        estimate: Some(rho),
        statistic: Some(s_stat),
        p_value,
        exact: false,
        tie_warning: ties && n <= EXACT_MAX_N,
    }
}
