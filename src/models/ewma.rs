/// models/ewma.rs — Exponentially Weighted Moving Average Volatility
///
/// ─────────────────────────────────────────────────────────────────────────
/// MATHEMATICAL SPECIFICATION
/// ─────────────────────────────────────────────────────────────────────────
///
/// RiskMetrics-style recursive variance estimate with decay λ ∈ (0, 1):
///
/// ```text
///     σ²_1 = Var(r_1 … r_N)            (seed, see note below)
///     σ²_t = λ·σ²_{t-1} + (1−λ)·r²_t,  t = 2 … N
/// ```
///
/// Output is one volatility (√variance) per input return; the last element
/// is the "current" estimate and serves as a naive one-step forecast.
///
/// SEED NOTE: the recursion is seeded with the *full-sample* variance.
/// That is a deliberate look-ahead, kept so every run reproduces the same
/// numbers; it is a recognized approximation, not a claim of correct
/// initialization.  A pre-sample seed would avoid the look-ahead at the
/// cost of changing every downstream value.
/// ─────────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{Result, RiskError};
use crate::series::ReturnSeries;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EwmaEstimator {
    /// Decay parameter λ; the RiskMetrics daily convention is 0.94.
    pub lambda: f64,
}

impl EwmaEstimator {
    pub fn new(lambda: f64) -> Result<Self> {
        if !(lambda > 0.0 && lambda < 1.0) {
            return Err(RiskError::invalid_data(format!(
                "EWMA decay must lie in (0, 1), got {lambda}"
            )));
        }
        Ok(Self { lambda })
    }

    /// Run the recursion over a return series.
    ///
    /// Returns one volatility per observation (same length as the input).
    /// Deterministic; the only failure mode is an empty series.
    pub fn estimate(&self, series: &ReturnSeries) -> Result<Vec<f64>> {
        if series.is_empty() {
            return Err(RiskError::invalid_data("EWMA needs at least 1 return"));
        }

        let mut var = series.sample_variance();
        let mut vols = Vec::with_capacity(series.len());
        vols.push(var.sqrt());

        for &r in &series.values()[1..] {
            var = self.lambda * var + (1.0 - self.lambda) * r * r;
            vols.push(var.sqrt());
        }
        Ok(vols)
    }
}
