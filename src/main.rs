/// main.rs — Pipeline Entry Point
///
/// Runs the full volatility → risk pipeline:
///   1. Load config from .env
///   2. Fetch prices (CSV file or synthetic GBM feed)
///   3. Build the return series
///   4. EWMA volatility + GARCH(1,1) MLE fit and forecast
///   5. Monte Carlo VaR/CVaR from the forecasted volatility
///   6. Print the report, export PnL / volatility series / JSON summary
use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use var_engine::config::AppConfig;
use var_engine::feed::{CsvFileFeed, PriceFeed, SyntheticGbmFeed};
use var_engine::solver::NelderMead;
use var_engine::{
    export, EwmaEstimator, Garch11, MonteCarloRiskEngine, ReturnSeries, RiskReport,
    SimulationSpec,
};

fn main() -> Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════╗");
    info!("║   VAR ENGINE  —  EWMA / GARCH(1,1) / MC VaR  ║");
    info!("╚══════════════════════════════════════════════╝");

    // ── Config ───────────────────────────────────────────────────────────
    let cfg = AppConfig::from_env()?;
    info!(
        "Config: symbol={} periods={} λ={} paths={} confidence={}",
        cfg.symbol, cfg.periods, cfg.ewma_lambda, cfg.mc_paths, cfg.confidence
    );
    if cfg.mc_seed.is_none() {
        warn!("MC_SEED unset — simulation output will not be reproducible");
    }

    // ── Fetch prices ─────────────────────────────────────────────────────
    let quotes = match &cfg.data_file {
        Some(path) => CsvFileFeed::new(path).fetch(&cfg.symbol, cfg.periods)?,
        None => SyntheticGbmFeed {
            s0: cfg.synth_s0,
            mu: cfg.synth_mu,
            sigma: cfg.synth_sigma,
            seed: cfg.synth_seed,
        }
        .fetch(&cfg.symbol, cfg.periods)?,
    };
    let s0 = quotes
        .last()
        .map(|q| q.price)
        .ok_or_else(|| anyhow::anyhow!("price feed returned no data"))?;

    let series = ReturnSeries::from_quotes(&quotes)?;
    info!("Loaded {} daily returns for {}", series.len(), cfg.symbol);

    // ── Volatility estimation ────────────────────────────────────────────
    let ewma = EwmaEstimator::new(cfg.ewma_lambda)?;
    let ewma_vols = ewma.estimate(&series)?;

    let mut garch = Garch11::with_solver(NelderMead::new(cfg.garch_max_iters, cfg.garch_tolerance));
    let params = garch.fit(&series)?;
    let garch_vols = garch
        .conditional_volatility()
        .ok_or_else(|| anyhow::anyhow!("fit succeeded but diagnostics are missing"))?;

    let forecast = garch.forecast(cfg.horizon_days)?;
    info!(
        "{}-day ahead volatility forecast: {:.4}% daily ({:.2}% annualized)",
        cfg.horizon_days,
        forecast.sigma(),
        forecast.sigma_annualized(cfg.trading_days)
    );

    // ── Monte Carlo VaR ──────────────────────────────────────────────────
    // Annualized drift from the sample mean of percentage returns.
    let mu_annual = series.mean() * cfg.trading_days / 100.0;
    let spec = SimulationSpec {
        s0,
        mu: mu_annual,
        sigma_pct: forecast.sigma_annualized(cfg.trading_days),
        horizon_years: cfg.horizon_days as f64 / cfg.trading_days,
        paths: cfg.mc_paths,
        confidence: cfg.confidence,
    };
    let engine = MonteCarloRiskEngine::new(cfg.mc_seed);
    let result = engine.simulate(&spec)?;
    let (analytic_var, analytic_cvar) = MonteCarloRiskEngine::analytic_var_cvar(&spec)?;

    // ── Report & export ──────────────────────────────────────────────────
    let report = RiskReport {
        symbol: cfg.symbol.clone(),
        n_returns: series.len(),
        ewma_lambda: cfg.ewma_lambda,
        ewma_vol_daily: *ewma_vols.last().unwrap_or(&0.0),
        garch: params,
        horizon_days: cfg.horizon_days,
        forecast_vol_daily: forecast.sigma(),
        forecast_vol_annual: forecast.sigma_annualized(cfg.trading_days),
        s0,
        paths: cfg.mc_paths,
        confidence: cfg.confidence,
        var: result.var,
        cvar: result.cvar,
        analytic_var,
        analytic_cvar,
    };
    println!("\n{report}");

    export::write_pnl_csv(Path::new(&cfg.pnl_csv), &result.pnl)?;
    export::write_volatility_csv(
        Path::new(&cfg.vol_csv),
        &[("ewma", ewma_vols.as_slice()), ("garch", garch_vols.as_slice())],
    )?;
    export::write_summary_json(Path::new(&cfg.summary_json), &report)?;

    Ok(())
}
