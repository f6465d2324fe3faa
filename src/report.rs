//! Human-readable run report.

use serde::Serialize;

use crate::models::garch::GarchParams;

/// Headline numbers from one pipeline run: estimators, forecast, and the
/// simulated vs analytic risk figures.
#[derive(Debug, Clone, Serialize)]
pub struct RiskReport {
    pub symbol: String,
    pub n_returns: usize,
    pub ewma_lambda: f64,
    /// Last EWMA volatility, percent per day.
    pub ewma_vol_daily: f64,
    pub garch: GarchParams,
    pub horizon_days: usize,
    /// Forecast volatility at the horizon, percent per day.
    pub forecast_vol_daily: f64,
    /// Forecast volatility, annualized percent.
    pub forecast_vol_annual: f64,
    pub s0: f64,
    pub paths: usize,
    pub confidence: f64,
    pub var: f64,
    pub cvar: f64,
    pub analytic_var: f64,
    pub analytic_cvar: f64,
}

impl std::fmt::Display for RiskReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "════════════════════════════════════════════")?;
        writeln!(f, "  VAR ENGINE — VOLATILITY & RISK REPORT")?;
        writeln!(f, "════════════════════════════════════════════")?;
        writeln!(f, "  Symbol          : {}", self.symbol)?;
        writeln!(f, "  Returns         : {}", self.n_returns)?;
        writeln!(f, "  EWMA λ          : {:.2}", self.ewma_lambda)?;
        writeln!(f, "  EWMA vol (day)  : {:.4}%", self.ewma_vol_daily)?;
        writeln!(f, "  GARCH ω         : {:.6e}", self.garch.omega)?;
        writeln!(f, "  GARCH α         : {:.4}", self.garch.alpha)?;
        writeln!(f, "  GARCH β         : {:.4}", self.garch.beta)?;
        writeln!(f, "  Persistence α+β : {:.4}", self.garch.persistence())?;
        writeln!(f, "  Long-run vol    : {:.4}%", self.garch.long_run_variance().sqrt())?;
        writeln!(f, "  Forecast ({}d)   : {:.4}% daily / {:.2}% annual",
            self.horizon_days, self.forecast_vol_daily, self.forecast_vol_annual)?;
        writeln!(f, "  ────────────────────────────────────────")?;
        writeln!(f, "  S0              : ${:.2}", self.s0)?;
        writeln!(f, "  Paths           : {}", self.paths)?;
        writeln!(f, "  Confidence      : {:.0}%", self.confidence * 100.0)?;
        writeln!(f, "  VaR             : ${:.2}", self.var)?;
        writeln!(f, "  CVaR            : ${:.2}", self.cvar)?;
        writeln!(f, "  VaR  (analytic) : ${:.2}", self.analytic_var)?;
        writeln!(f, "  CVaR (analytic) : ${:.2}", self.analytic_cvar)?;
        writeln!(f, "════════════════════════════════════════════")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_renders_and_serializes() {
        let report = RiskReport {
            symbol: "SPY".into(),
            n_returns: 251,
            ewma_lambda: 0.94,
            ewma_vol_daily: 0.82,
            garch: GarchParams { omega: 0.02, alpha: 0.08, beta: 0.90 },
            horizon_days: 1,
            forecast_vol_daily: 0.85,
            forecast_vol_annual: 13.49,
            s0: 450.0,
            paths: 10_000,
            confidence: 0.95,
            var: -9.73,
            cvar: -12.10,
            analytic_var: -9.80,
            analytic_cvar: -12.25,
        };
        let text = format!("{report}");
        assert!(text.contains("VaR"));
        assert!(text.contains("SPY"));
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"confidence\":0.95"));
    }
}
