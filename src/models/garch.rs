/// models/garch.rs — GARCH(1,1) Maximum-Likelihood Volatility Model
///
/// ─────────────────────────────────────────────────────────────────────────
/// MATHEMATICAL SPECIFICATION
/// ─────────────────────────────────────────────────────────────────────────
///
/// GARCH(1,1): Bollerslev (1986)
///
///   Return innovation:  ε_t = r_t − μ          (μ = sample mean)
///   Conditional variance update:
///
/// ```text
///       σ²_t = ω  +  α · ε²_{t-1}  +  β · σ²_{t-1},   σ²_1 = Var(r)
/// ```
///
///   Constraints (covariance stationarity):
///     ω > 0,  α ≥ 0,  β ≥ 0,  α + β < 1
///
///   Long-run (unconditional) variance:
///       σ²_∞ = ω / (1 − α − β)
///
///   Gaussian negative log-likelihood (minimized by the simplex solver):
///       NLL = Σ_t ½·[ln 2π + ln σ²_t + ε²_t / σ²_t]
///
///   Forecast:
///       σ²_{T+1} = ω + α·ε²_T + β·σ²_T
///       σ²_{T+h} = ω + (α+β)·σ²_{T+h-1}        (E[ε²] = σ² beyond step 1)
///   which converges to σ²_∞ as h grows.
///
/// Units follow the input returns: with percentage returns, variances are
/// percent² per observation period.
/// ─────────────────────────────────────────────────────────────────────────
use ndarray::{array, Array1};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, RiskError};
use crate::series::ReturnSeries;
use crate::solver::{CostFunction, NelderMead};

const SMALL_POS: f64 = 1e-12;
const PENALTY: f64 = 1e12;
const LN_2PI: f64 = 1.8378770664093453;

/// Fitted GARCH(1,1) parameter triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GarchParams {
    /// ω: long-run variance weight
    pub omega: f64,
    /// α: ARCH (shock) coefficient
    pub alpha: f64,
    /// β: GARCH (persistence) coefficient
    pub beta: f64,
}

impl GarchParams {
    /// Stationarity / positivity check: ω > 0, α ≥ 0, β ≥ 0, α + β < 1.
    pub fn is_valid(&self) -> bool {
        self.omega > 0.0 && self.alpha >= 0.0 && self.beta >= 0.0 && self.persistence() < 1.0
    }

    /// α + β
    pub fn persistence(&self) -> f64 {
        self.alpha + self.beta
    }

    /// σ²_∞ = ω / (1 − α − β)
    pub fn long_run_variance(&self) -> f64 {
        self.omega / (1.0 - self.persistence())
    }
}

/// Forecasted variance path, one value per step ahead.
///
/// Values are per-period variances in the same units as the fitted returns
/// (percent² for percentage returns); use the accessors to convert so
/// daily vs annualized can never be confused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityForecast {
    pub horizon: usize,
    /// σ²_{T+1} … σ²_{T+horizon}, per-period units.
    pub variances: Vec<f64>,
}

impl VolatilityForecast {
    /// Variance at the terminal step of the horizon.
    pub fn variance(&self) -> f64 {
        *self.variances.last().expect("forecast horizon is at least 1")
    }

    /// Per-period volatility at the terminal step (percent for % returns).
    pub fn sigma(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Annualized volatility: σ·√(periods per year), e.g. 252 trading days.
    pub fn sigma_annualized(&self, periods_per_year: f64) -> f64 {
        (self.variance() * periods_per_year).sqrt()
    }
}

/// Negative log-likelihood over (ω, α, β); infeasible points cost `PENALTY`
/// so the simplex never steps outside the stationarity region.
struct GarchNll<'a> {
    residuals: &'a [f64],
    seed_var: f64,
}

impl CostFunction for GarchNll<'_> {
    fn cost(&self, x: &Array1<f64>) -> f64 {
        let params = GarchParams { omega: x[0], alpha: x[1], beta: x[2] };
        if !params.is_valid() {
            return PENALTY;
        }

        let sigma2 = variance_recursion(self.residuals, &params, self.seed_var);
        let mut nll = 0.0;
        for (eps, s2) in self.residuals.iter().zip(&sigma2) {
            if *s2 <= 0.0 {
                return PENALTY;
            }
            nll += 0.5 * (LN_2PI + s2.ln() + eps * eps / s2);
        }
        nll
    }
}

/// In-sample recursion σ²_1 … σ²_N shared by the likelihood and the
/// post-fit diagnostics.
fn variance_recursion(residuals: &[f64], params: &GarchParams, seed_var: f64) -> Vec<f64> {
    let mut sigma2 = Vec::with_capacity(residuals.len());
    sigma2.push(seed_var.max(SMALL_POS));
    for t in 1..residuals.len() {
        let prev_eps = residuals[t - 1];
        let prev_var = sigma2[t - 1];
        sigma2.push(params.omega + params.alpha * prev_eps * prev_eps + params.beta * prev_var);
    }
    sigma2
}

/// GARCH(1,1) model instance: fit once, then forecast.
#[derive(Debug, Clone)]
pub struct Garch11 {
    solver: NelderMead,
    params: Option<GarchParams>,
    /// In-sample σ²_t series, produced by `fit`, read-only thereafter.
    cond_variance: Vec<f64>,
    last_epsilon: f64,
    mu: f64,
}

impl Default for Garch11 {
    fn default() -> Self {
        Self::new()
    }
}

impl Garch11 {
    pub fn new() -> Self {
        Self::with_solver(NelderMead::default())
    }

    /// Use a specific solver configuration (iteration budget, tolerance).
    pub fn with_solver(solver: NelderMead) -> Self {
        Self {
            solver,
            params: None,
            cond_variance: Vec::new(),
            last_epsilon: 0.0,
            mu: 0.0,
        }
    }

    /// Fit (ω, α, β) by Gaussian maximum likelihood.
    ///
    /// Start point: α = 0.05, β = 0.90, ω = Var(r)·(1 − α − β), inside the
    /// feasible region.  Fails with `Convergence` when the solver exhausts
    /// its budget or the optimum drifts outside stationarity — parameters
    /// are never clamped to rescue a bad fit.
    ///
    /// On success the fitted parameters, the in-sample conditional-variance
    /// series, and the last residual are stored on the instance.
    pub fn fit(&mut self, series: &ReturnSeries) -> Result<GarchParams> {
        let n = series.len();
        if n < 3 {
            return Err(RiskError::invalid_data(format!(
                "GARCH(1,1) fit needs at least 3 returns, got {n}"
            )));
        }

        let mu = series.mean();
        let residuals: Vec<f64> = series.values().iter().map(|r| r - mu).collect();
        let seed_var = series.sample_variance().max(SMALL_POS);

        let alpha0 = 0.05;
        let beta0 = 0.90;
        let omega0 = seed_var * (1.0 - alpha0 - beta0);
        let x0 = array![omega0, alpha0, beta0];
        debug!(omega0, alpha0, beta0, n, "starting GARCH MLE");

        let objective = GarchNll { residuals: &residuals, seed_var };
        let x = self.solver.minimize(&objective, x0)?;

        let params = GarchParams { omega: x[0], alpha: x[1], beta: x[2] };
        if !params.is_valid() {
            // Numerical drift at the stationarity boundary is a failed fit.
            return Err(RiskError::convergence(format!(
                "fitted parameters violate stationarity: ω={:.6e} α={:.4} β={:.4} α+β={:.6}",
                params.omega,
                params.alpha,
                params.beta,
                params.persistence()
            )));
        }

        self.cond_variance = variance_recursion(&residuals, &params, seed_var);
        self.last_epsilon = residuals[n - 1];
        self.mu = mu;
        self.params = Some(params);

        info!(
            omega = params.omega,
            alpha = params.alpha,
            beta = params.beta,
            persistence = params.persistence(),
            "GARCH(1,1) fit complete"
        );
        Ok(params)
    }

    pub fn params(&self) -> Option<&GarchParams> {
        self.params.as_ref()
    }

    /// Sample mean used for mean adjustment (set by `fit`).
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// In-sample conditional volatility σ_t, one per fitted return.
    pub fn conditional_volatility(&self) -> Option<Vec<f64>> {
        if self.params.is_none() {
            return None;
        }
        Some(self.cond_variance.iter().map(|v| v.sqrt()).collect())
    }

    /// h-step-ahead variance forecast.
    ///
    /// Step 1 uses the last in-sample residual and variance; later steps
    /// replace the unavailable realized ε² with its expectation σ², pulling
    /// the path toward the long-run variance ω/(1−α−β).
    pub fn forecast(&self, horizon: usize) -> Result<VolatilityForecast> {
        let params = self.params.ok_or(RiskError::NotFitted)?;
        if horizon == 0 {
            return Err(RiskError::invalid_data("forecast horizon must be >= 1"));
        }

        let last_var = *self
            .cond_variance
            .last()
            .expect("fit stores a non-empty variance series");

        let mut variances = Vec::with_capacity(horizon);
        let mut step =
            params.omega + params.alpha * self.last_epsilon * self.last_epsilon + params.beta * last_var;
        variances.push(step);
        for _ in 1..horizon {
            step = params.omega + params.persistence() * step;
            variances.push(step);
        }

        Ok(VolatilityForecast { horizon, variances })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rand_distr::StandardNormal;

    /// Simulate a GARCH(1,1) return path with known parameters so the
    /// fitter has genuine ARCH structure to find.
    fn simulated_series(n: usize, seed: u64) -> ReturnSeries {
        let (omega, alpha, beta) = (0.10, 0.10, 0.80);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut var = omega / (1.0 - alpha - beta);
        let mut eps = 0.0_f64;
        let mut returns = Vec::with_capacity(n);
        for _ in 0..n {
            var = omega + alpha * eps * eps + beta * var;
            let z: f64 = rng.sample(StandardNormal);
            eps = var.sqrt() * z;
            returns.push(eps);
        }

        let mut prices = vec![100.0];
        for r in &returns {
            let last = *prices.last().unwrap();
            prices.push(last * (1.0 + r / 100.0));
        }
        ReturnSeries::from_prices(&prices).unwrap()
    }

    #[test]
    fn fit_recovers_a_stationary_model() {
        let series = simulated_series(1500, 42);
        let mut model = Garch11::new();
        let params = model.fit(&series).unwrap();

        assert!(params.is_valid());
        assert!(params.persistence() < 1.0);
        assert!(params.persistence() > 0.3, "persistence = {}", params.persistence());
        // In-sample diagnostics cover every observation.
        assert_eq!(model.conditional_volatility().unwrap().len(), series.len());
    }

    #[test]
    fn fit_is_deterministic() {
        let series = simulated_series(800, 7);
        let mut a = Garch11::new();
        let mut b = Garch11::new();
        a.fit(&series).unwrap();
        b.fit(&series).unwrap();
        let fa = a.forecast(1).unwrap();
        let fb = b.forecast(1).unwrap();
        assert_eq!(fa.variance(), fb.variance());
    }

    #[test]
    fn one_step_forecast_matches_recursion() {
        let series = simulated_series(600, 3);
        let mut model = Garch11::new();
        let params = model.fit(&series).unwrap();

        let eps = series.values()[series.len() - 1] - model.mu();
        let last_var = model
            .conditional_volatility()
            .unwrap()
            .last()
            .map(|s| s * s)
            .unwrap();
        let expected = params.omega + params.alpha * eps * eps + params.beta * last_var;

        let fc = model.forecast(1).unwrap();
        assert_eq!(fc.horizon, 1);
        assert!((fc.variance() - expected).abs() < 1e-9 * expected.max(1.0));
    }

    #[test]
    fn long_horizon_approaches_long_run_variance() {
        let series = simulated_series(1000, 11);
        let mut model = Garch11::new();
        let params = model.fit(&series).unwrap();

        let fc = model.forecast(500).unwrap();
        assert_eq!(fc.variances.len(), 500);
        let long_run = params.long_run_variance();
        let rel = (fc.variance() - long_run).abs() / long_run;
        assert!(rel < 1e-3, "terminal {} vs long-run {long_run}", fc.variance());
    }

    #[test]
    fn forecast_before_fit_is_not_fitted() {
        let model = Garch11::new();
        assert!(matches!(model.forecast(1), Err(RiskError::NotFitted)));
    }

    #[test]
    fn short_series_is_invalid_data() {
        let series = ReturnSeries::from_prices(&[100.0, 101.0, 100.5]).unwrap();
        let mut model = Garch11::new();
        assert!(matches!(model.fit(&series), Err(RiskError::InvalidData { .. })));
    }

    #[test]
    fn exhausted_budget_surfaces_convergence_error() {
        let series = simulated_series(400, 9);
        let mut model = Garch11::with_solver(NelderMead::new(3, 1e-16));
        assert!(matches!(model.fit(&series), Err(RiskError::Convergence { .. })));
    }

    #[test]
    fn annualization_helper_scales_by_sqrt_periods() {
        let fc = VolatilityForecast { horizon: 1, variances: vec![4.0] };
        assert!((fc.sigma() - 2.0).abs() < 1e-12);
        assert!((fc.sigma_annualized(252.0) - (4.0 * 252.0_f64).sqrt()).abs() < 1e-12);
    }
}
