/// simulation.rs — Monte Carlo VaR / CVaR under Geometric Brownian Motion
///
/// ─────────────────────────────────────────────────────────────────────────
/// MATHEMATICAL SPECIFICATION
/// ─────────────────────────────────────────────────────────────────────────
///
/// Terminal price per path, Z ~ N(0, 1) i.i.d.:
///
/// ```text
///     S_T = S0 · exp((μ − ½σ²)·T + σ·√T·Z)
/// ```
///
/// PnL per path: S_T − S0.
///
/// VaR at confidence c = (1−c)-quantile of the PnL distribution, with
/// linear interpolation between order statistics (numpy `percentile`
/// convention — part of the documented contract since it affects exact
/// output).
///
/// CVaR (expected shortfall) = mean of PnL at or below the VaR threshold.
/// Invariant: CVaR ≤ VaR for any non-degenerate tail.
///
/// Closed-form counterparts (used as convergence reference):
///
/// ```text
///     q        = Φ⁻¹(1 − c)
///     VaR*     = S0 · [exp((μ − ½σ²)T + σ√T·q) − 1]
///     CVaR*    = S0 · [exp(μT) · Φ(q − σ√T)/(1 − c) − 1]
/// ```
///
/// UNITS: σ is annualized *percent* (20 = 20%) and is divided by 100
/// internally; μ is an annualized decimal; the horizon is in years
/// (1/252 = one trading day).
/// ─────────────────────────────────────────────────────────────────────────
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

use crate::error::{Result, RiskError};
use crate::stats;

/// Paths generated per parallel work unit.  Each chunk owns an RNG seeded
/// from the master seed + chunk index, so output for a given seed is
/// identical at any thread count.
const CHUNK_PATHS: usize = 4096;

/// Inputs to one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSpec {
    /// Initial price, > 0.
    pub s0: f64,
    /// Expected return, annualized decimal (0.05 = 5%).
    pub mu: f64,
    /// Volatility, annualized percent (20.0 = 20%).
    pub sigma_pct: f64,
    /// Horizon in years (1.0/252.0 = one trading day).
    pub horizon_years: f64,
    /// Number of Monte Carlo paths, ≥ 1.
    pub paths: usize,
    /// VaR confidence level, in (0, 1).
    pub confidence: f64,
}

impl SimulationSpec {
    fn validate(&self) -> Result<()> {
        if !(self.s0 > 0.0) || !self.s0.is_finite() {
            return Err(RiskError::invalid_data(format!("S0 must be > 0, got {}", self.s0)));
        }
        if !(self.sigma_pct >= 0.0) || !self.sigma_pct.is_finite() {
            return Err(RiskError::invalid_data(format!(
                "sigma must be >= 0, got {}",
                self.sigma_pct
            )));
        }
        if !self.mu.is_finite() {
            return Err(RiskError::invalid_data(format!("mu must be finite, got {}", self.mu)));
        }
        if !(self.horizon_years > 0.0) || !self.horizon_years.is_finite() {
            return Err(RiskError::invalid_data(format!(
                "horizon must be > 0 years, got {}",
                self.horizon_years
            )));
        }
        if self.paths == 0 {
            return Err(RiskError::invalid_data("path count must be >= 1"));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(RiskError::invalid_data(format!(
                "confidence must lie in (0, 1), got {}",
                self.confidence
            )));
        }
        Ok(())
    }
}

/// Loss distribution plus its percentile risk statistics.  Produced fresh
/// per `simulate` call; the PnL vector is owned by the caller thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Terminal PnL per path (S_T − S0), unsorted.
    pub pnl: Vec<f64>,
    pub var: f64,
    pub cvar: f64,
    pub confidence: f64,
}

/// Monte Carlo engine. Carries only the master seed; all per-run state is
/// local to `simulate`, so concurrent calls never share mutable state.
///
/// `seed: None` draws from OS entropy and is *not* reproducible — pass a
/// seed whenever deterministic output matters (tests, audit reruns).
#[derive(Debug, Clone, Copy)]
pub struct MonteCarloRiskEngine {
    pub seed: Option<u64>,
}

impl MonteCarloRiskEngine {
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    /// Simulate the terminal PnL distribution and compute VaR / CVaR.
    pub fn simulate(&self, spec: &SimulationSpec) -> Result<SimulationResult> {
        spec.validate()?;

        let sigma = spec.sigma_pct / 100.0;
        let t = spec.horizon_years;
        let drift = (spec.mu - 0.5 * sigma * sigma) * t;
        let diffusion = sigma * t.sqrt();

        // ── Path generation (embarrassingly parallel) ────────────────────
        let n_chunks = spec.paths.div_ceil(CHUNK_PATHS);
        let chunks: Vec<Vec<f64>> = (0..n_chunks)
            .into_par_iter()
            .map(|chunk| {
                let mut rng = match self.seed {
                    Some(s) => StdRng::seed_from_u64(s.wrapping_add(chunk as u64)),
                    None => StdRng::from_entropy(),
                };
                let count = CHUNK_PATHS.min(spec.paths - chunk * CHUNK_PATHS);
                (0..count)
                    .map(|_| {
                        let z: f64 = rng.sample(StandardNormal);
                        spec.s0 * (drift + diffusion * z).exp() - spec.s0
                    })
                    .collect()
            })
            .collect();

        // Merge in chunk-index order; the reductions below do not depend
        // on path ordering.
        let mut pnl = Vec::with_capacity(spec.paths);
        for c in chunks {
            pnl.extend(c);
        }

        let (var, cvar) = var_cvar(&pnl, spec.confidence);
        debug!(
            paths = spec.paths,
            confidence = spec.confidence,
            var,
            cvar,
            "simulation complete"
        );

        Ok(SimulationResult { pnl, var, cvar, confidence: spec.confidence })
    }

    /// Closed-form GBM VaR / CVaR for the same spec — the values the Monte
    /// Carlo estimates converge to as the path count grows.
    pub fn analytic_var_cvar(spec: &SimulationSpec) -> Result<(f64, f64)> {
        spec.validate()?;
        let sigma = spec.sigma_pct / 100.0;
        let t = spec.horizon_years;
        let p = 1.0 - spec.confidence;

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| RiskError::invalid_data(format!("standard normal: {e}")))?;
        let q = normal.inverse_cdf(p);

        let var = spec.s0 * (((spec.mu - 0.5 * sigma * sigma) * t + sigma * t.sqrt() * q).exp() - 1.0);

        // E[S_T | Z ≤ q] = S0·exp(μT)·Φ(q − σ√T)/p
        let cvar = if sigma == 0.0 {
            var
        } else {
            spec.s0 * ((spec.mu * t).exp() * normal.cdf(q - sigma * t.sqrt()) / p - 1.0)
        };
        Ok((var, cvar))
    }
}

/// VaR as the (1−c)-quantile of the PnL distribution, CVaR as the mean of
/// the tail at or below it.
fn var_cvar(pnl: &[f64], confidence: f64) -> (f64, f64) {
    let mut sorted = pnl.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let var = stats::quantile(&sorted, 1.0 - confidence);
    let tail: Vec<f64> = sorted.iter().copied().take_while(|&x| x <= var).collect();
    // The interpolated quantile never falls below the sample minimum, so
    // the tail holds at least one element.
    let cvar = stats::mean(&tail).unwrap_or(var);
    (var, cvar)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibration_spec(paths: usize) -> SimulationSpec {
        // Reference calibration: S0=100, μ=5%, σ=20% annualized, 1 day.
        SimulationSpec {
            s0: 100.0,
            mu: 0.05,
            sigma_pct: 20.0,
            horizon_years: 1.0 / 252.0,
            paths,
            confidence: 0.95,
        }
    }

    #[test]
    fn var_is_a_loss_and_cvar_is_deeper() {
        let engine = MonteCarloRiskEngine::new(Some(42));
        let result = engine.simulate(&calibration_spec(1000)).unwrap();

        assert_eq!(result.pnl.len(), 1000);
        assert!(result.var < 0.0, "95% VaR should be a loss, got {}", result.var);
        assert!(result.cvar < result.var, "CVaR {} !< VaR {}", result.cvar, result.var);
    }

    #[test]
    fn same_seed_reproduces_exactly() {
        let engine = MonteCarloRiskEngine::new(Some(7));
        let a = engine.simulate(&calibration_spec(5000)).unwrap();
        let b = engine.simulate(&calibration_spec(5000)).unwrap();
        assert_eq!(a.pnl, b.pnl);
        assert_eq!(a.var, b.var);
        assert_eq!(a.cvar, b.cvar);
    }

    #[test]
    fn var_converges_with_path_count() {
        let engine = MonteCarloRiskEngine::new(Some(42));
        let var_1k = engine.simulate(&calibration_spec(1_000)).unwrap().var;
        let var_10k = engine.simulate(&calibration_spec(10_000)).unwrap().var;
        assert!(
            (var_1k - var_10k).abs() < 5.0,
            "1k vs 10k paths differ too much: {var_1k} vs {var_10k}"
        );
    }

    #[test]
    fn estimates_approach_analytic_values() {
        let spec = calibration_spec(200_000);
        let engine = MonteCarloRiskEngine::new(Some(123));
        let result = engine.simulate(&spec).unwrap();
        let (var_exact, cvar_exact) = MonteCarloRiskEngine::analytic_var_cvar(&spec).unwrap();

        // One-day 20%-vol VaR on S0=100 is ≈ −2.0; demand ~2% accuracy.
        assert!(var_exact < 0.0 && cvar_exact < var_exact);
        assert!(
            (result.var - var_exact).abs() < 0.15,
            "MC VaR {} vs analytic {var_exact}",
            result.var
        );
        assert!(
            (result.cvar - cvar_exact).abs() < 0.25,
            "MC CVaR {} vs analytic {cvar_exact}",
            result.cvar
        );
    }

    #[test]
    fn single_path_is_degenerate_but_valid() {
        let engine = MonteCarloRiskEngine::new(Some(1));
        let result = engine.simulate(&calibration_spec(1)).unwrap();
        assert_eq!(result.pnl.len(), 1);
        // Degenerate tail: equality permitted.
        assert_eq!(result.var, result.cvar);
    }

    #[test]
    fn zero_volatility_is_deterministic_drift() {
        let spec = SimulationSpec { sigma_pct: 0.0, ..calibration_spec(100) };
        let result = MonteCarloRiskEngine::new(Some(5)).simulate(&spec).unwrap();
        let expected = 100.0 * ((0.05 / 252.0_f64).exp() - 1.0);
        for p in &result.pnl {
            assert!((p - expected).abs() < 1e-9);
        }
        assert!((result.var - expected).abs() < 1e-9);
    }

    #[test]
    fn preconditions_are_enforced() {
        let engine = MonteCarloRiskEngine::new(None);
        let bad_specs = [
            SimulationSpec { s0: 0.0, ..calibration_spec(10) },
            SimulationSpec { sigma_pct: -1.0, ..calibration_spec(10) },
            SimulationSpec { paths: 0, ..calibration_spec(10) },
            SimulationSpec { confidence: 1.0, ..calibration_spec(10) },
            SimulationSpec { confidence: 0.0, ..calibration_spec(10) },
            SimulationSpec { horizon_years: 0.0, ..calibration_spec(10) },
        ];
        for spec in bad_specs {
            assert!(
                matches!(engine.simulate(&spec), Err(RiskError::InvalidData { .. })),
                "expected InvalidData for {spec:?}"
            );
        }
    }
}
