//! Price feeds — the external-collaborator seam for market data.
//!
//! The core estimators are I/O-free; everything that produces a
//! chronological `(timestamp, price)` sequence sits behind `PriceFeed`.
//! Two implementations ship with the binary: a CSV file reader and a
//! seeded synthetic GBM generator for running the pipeline offline.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use tracing::info;

use crate::error::{Result, RiskError};
use crate::series::PricePoint;

pub trait PriceFeed {
    /// Fetch up to `periods` chronological observations for `symbol`
    /// (`periods == 0` means "everything available").
    fn fetch(&self, symbol: &str, periods: usize) -> Result<Vec<PricePoint>>;
}

/// Reads `timestamp,price` rows (RFC 3339 timestamps); a single header
/// line is tolerated. The symbol is informational only — one file, one
/// instrument.
pub struct CsvFileFeed {
    pub path: PathBuf,
}

impl CsvFileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PriceFeed for CsvFileFeed {
    fn fetch(&self, symbol: &str, periods: usize) -> Result<Vec<PricePoint>> {
        let file = File::open(&self.path)?;
        let mut points = Vec::new();

        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((ts_str, price_str)) = line.split_once(',') else {
                return Err(RiskError::invalid_data(format!(
                    "{}: line {}: expected 'timestamp,price'",
                    self.path.display(),
                    idx + 1
                )));
            };
            let parsed_ts = ts_str.trim().parse::<DateTime<Utc>>();
            let parsed_price = price_str.trim().parse::<f64>();
            match (parsed_ts, parsed_price) {
                (Ok(timestamp), Ok(price)) => points.push(PricePoint { timestamp, price }),
                // Header row
                _ if idx == 0 => continue,
                _ => {
                    return Err(RiskError::invalid_data(format!(
                        "{}: line {}: unparsable row '{line}'",
                        self.path.display(),
                        idx + 1
                    )));
                }
            }
        }

        if periods > 0 && points.len() > periods {
            points.drain(..points.len() - periods);
        }
        info!(symbol, rows = points.len(), path = %self.path.display(), "loaded price file");
        Ok(points)
    }
}

/// Deterministic GBM price generator: daily closes from a seeded RNG, so
/// demo runs reproduce exactly.
pub struct SyntheticGbmFeed {
    pub s0: f64,
    /// Annualized drift (decimal).
    pub mu: f64,
    /// Annualized volatility (decimal).
    pub sigma: f64,
    pub seed: u64,
}

impl PriceFeed for SyntheticGbmFeed {
    fn fetch(&self, symbol: &str, periods: usize) -> Result<Vec<PricePoint>> {
        if periods < 2 {
            return Err(RiskError::invalid_data(format!(
                "synthetic feed needs at least 2 periods, got {periods}"
            )));
        }
        let dt = 1.0 / 252.0;
        let drift = (self.mu - 0.5 * self.sigma * self.sigma) * dt;
        let diffusion = self.sigma * dt.sqrt();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let start = Utc::now() - Duration::days(periods as i64);
        let mut price = self.s0;
        let mut points = Vec::with_capacity(periods);
        for i in 0..periods {
            points.push(PricePoint {
                timestamp: start + Duration::days(i as i64),
                price,
            });
            let z: f64 = rng.sample(StandardNormal);
            price *= (drift + diffusion * z).exp();
        }
        info!(symbol, rows = periods, seed = self.seed, "generated synthetic prices");
        Ok(points)
    }
}
