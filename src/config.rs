/// config.rs — Centralised configuration loaded from .env
///
/// All parameters consumed by the pipeline binary are defined here.
/// Loading happens once at startup; the library surfaces take plain
/// arguments and never read the environment themselves.
use anyhow::Result;
use std::env;

/// RiskMetrics daily decay convention.
pub const DEFAULT_EWMA_LAMBDA: f64 = 0.94;
/// Trading days per year used for annualisation.
pub const DEFAULT_TRADING_DAYS: f64 = 252.0;

#[derive(Debug, Clone)]
pub struct AppConfig {
    // ── Data source ──────────────────────────────────────────────────
    /// Instrument label, informational.
    pub symbol: String,
    /// Observations to load / generate (most recent kept).
    pub periods: usize,
    /// CSV price file (`timestamp,price`); unset → synthetic GBM feed.
    pub data_file: Option<String>,

    // ── Synthetic feed (when no data file is given) ──────────────────
    pub synth_s0:    f64,
    pub synth_mu:    f64,
    pub synth_sigma: f64,
    pub synth_seed:  u64,

    // ── Estimators ───────────────────────────────────────────────────
    /// EWMA decay λ
    pub ewma_lambda: f64,
    /// GARCH MLE iteration budget
    pub garch_max_iters: usize,
    /// GARCH MLE simplex convergence tolerance
    pub garch_tolerance: f64,
    /// Forecast horizon in trading days
    pub horizon_days: usize,
    pub trading_days: f64,

    // ── Monte Carlo ──────────────────────────────────────────────────
    pub mc_paths:   usize,
    pub confidence: f64,
    /// Master seed; unset → entropy (non-reproducible, logged as such)
    pub mc_seed: Option<u64>,

    // ── Output sinks ─────────────────────────────────────────────────
    pub pnl_csv:      String,
    pub vol_csv:      String,
    pub summary_json: String,
}

impl AppConfig {
    /// Load configuration from environment variables (after dotenv).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // ignore missing .env

        let data_file = env::var("DATA_FILE").ok().filter(|s| !s.is_empty());
        let mc_seed = match env::var("MC_SEED") {
            Ok(v) if !v.is_empty() => Some(v.parse::<u64>()
                .map_err(|e| anyhow::anyhow!("Config key MC_SEED: {e}"))?),
            _ => None,
        };

        Ok(Self {
            symbol: env::var("SYMBOL").unwrap_or_else(|_| "SPY".into()),
            periods: parse_env("PERIODS", 252usize)?,
            data_file,

            synth_s0:    parse_env("SYNTH_S0",    450.0)?,
            synth_mu:    parse_env("SYNTH_MU",    0.08)?,
            synth_sigma: parse_env("SYNTH_SIGMA", 0.20)?,
            synth_seed:  parse_env("SYNTH_SEED",  7u64)?,

            ewma_lambda:     parse_env("EWMA_LAMBDA", DEFAULT_EWMA_LAMBDA)?,
            garch_max_iters: parse_env("GARCH_MAX_ITERS", 5000usize)?,
            garch_tolerance: parse_env("GARCH_TOLERANCE", 1e-10)?,
            horizon_days:    parse_env("HORIZON_DAYS", 1usize)?,
            trading_days:    parse_env("TRADING_DAYS", DEFAULT_TRADING_DAYS)?,

            mc_paths:   parse_env("MC_PATHS", 10_000usize)?,
            confidence: parse_env("CONFIDENCE", 0.95)?,
            mc_seed,

            pnl_csv:      env::var("PNL_CSV").unwrap_or_else(|_| "var_simulation.csv".into()),
            vol_csv:      env::var("VOL_CSV").unwrap_or_else(|_| "volatility_comparison.csv".into()),
            summary_json: env::var("SUMMARY_JSON").unwrap_or_else(|_| "risk_summary.json".into()),
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + Copy,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Config key {key}: {e}")),
        Err(_) => Ok(default),
    }
}
