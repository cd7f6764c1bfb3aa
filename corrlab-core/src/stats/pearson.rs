//! Pearson product-moment correlation with a t test on n - 2 df.

use super::distribution::t_tails;
use super::CorTest;
use crate::domain::{Alternative, Method};

/// Sample correlation coefficient; `None` when either sample has zero variance.
pub fn coefficient(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    if x.is_empty() {
        return None;
    }
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

pub fn test(x: &[f64], y: &[f64], alternative: Alternative) -> CorTest {
    let n = x.len();
    let Some(r) = coefficient(x, y) else {
        return CorTest::undefined(Method::Pearson, alternative, n);
    };

    let df = (n - 2) as f64;
    let t = if r.abs() >= 1.0 {
        r.signum() * f64::INFINITY
    } else {
        df.sqrt() * r / (1.0 - r * r).sqrt()
    };
    let p_value = t_tails(t, df).map(|(lower, upper)| alternative.p_value(lower, upper));

    CorTest {
        method: Method::Pearson,
        alternative,
        n_pairs: n,
        estimate: Some(r),
        statistic: Some(t),
        p_value,
        exact: false,
        tie_warning: false,
    }
}
