//! Shared numeric helpers used by the estimators and the risk engine.

/// Arithmetic mean. `None` on empty input.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sample variance with the n−1 denominator. `None` for fewer than 2 points.
pub fn sample_variance(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    let m = mean(data)?;
    let ss = data.iter().map(|x| (x - m).powi(2)).sum::<f64>();
    Some(ss / (data.len() - 1) as f64)
}

/// Quantile of an ascending-sorted slice with linear interpolation between
/// order statistics (the numpy `percentile` convention): the value at
/// fractional rank `q·(n−1)`, `q ∈ [0, 1]`.
///
/// The interpolation choice affects exact VaR output and is part of the
/// engine's documented contract.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    debug_assert!((0.0..=1.0).contains(&q));
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = q * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}
