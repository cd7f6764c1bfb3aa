//! Tail probabilities of the reference distributions.
//!
//! Both tails are computed directly from the CDF of the negated statistic so
//! that tiny p-values keep their precision instead of cancelling in `1 - cdf`.

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// `(P(T <= t), P(T >= t))` for Student's t with `df` degrees of freedom.
pub fn t_tails(t: f64, df: f64) -> Option<(f64, f64)> {
    if t.is_nan() || df.is_nan() || df <= 0.0 {
        return None;
    }
    if t == f64::INFINITY {
        return Some((1.0, 0.0));
    }
    if t == f64::NEG_INFINITY {
        return Some((0.0, 1.0));
    }
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((dist.cdf(t), dist.cdf(-t)))
}

/// `(P(Z <= z), P(Z >= z))` for the standard normal.
pub fn normal_tails(z: f64) -> Option<(f64, f64)> {
    if z.is_nan() {
        return None;
    }
    if z.is_infinite() {
        return Some(if z > 0.0 { (1.0, 0.0) } else { (0.0, 1.0) });
    }
    let dist = Normal::new(0.0, 1.0).ok()?;
    Some((dist.cdf(z), dist.cdf(-z)))
}

/// Upper tail of the standard normal.
pub fn normal_upper(z: f64) -> f64 {
    normal_tails(z).map_or(f64::NAN, |(_, upper)| upper)
}
