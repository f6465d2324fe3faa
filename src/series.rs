/// series.rs — Price / Return Data Preparation
///
/// ─────────────────────────────────────────────────────────────────────────
/// Raw prices arrive as a chronological sequence (P_1 … P_N).  The engine
/// works on percentage returns:
///
/// ```text
///     r_t = 100 · (P_t / P_{t-1} − 1),   t = 2 … N
/// ```
///
/// giving N−1 returns for N prices.  A `ReturnSeries` is immutable once
/// built and guarantees: no NaN/Inf entries, every source price > 0, and
/// (for timestamped input) a strictly increasing time index.
/// ─────────────────────────────────────────────────────────────────────────
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RiskError};
use crate::stats;

/// A single observation from a price feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Ordered sequence of percentage returns, indexed by time.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    values: Vec<f64>,
}

impl ReturnSeries {
    /// Build a return series from a chronological price sequence.
    ///
    /// Fails with `InvalidData` if fewer than 2 prices are given, or if any
    /// price is non-finite or ≤ 0.
    pub fn from_prices(prices: &[f64]) -> Result<Self> {
        if prices.len() < 2 {
            return Err(RiskError::invalid_data(format!(
                "need at least 2 prices to form returns, got {}",
                prices.len()
            )));
        }
        for (i, &p) in prices.iter().enumerate() {
            if !p.is_finite() || p <= 0.0 {
                return Err(RiskError::invalid_data(format!(
                    "price at index {i} is not a positive finite number: {p}"
                )));
            }
        }

        let values = prices
            .windows(2)
            .map(|w| 100.0 * (w[1] / w[0] - 1.0))
            .collect();
        Ok(Self { values })
    }

    /// Build a return series from timestamped quotes, additionally
    /// validating that the time index is strictly increasing.
    pub fn from_quotes(quotes: &[PricePoint]) -> Result<Self> {
        for (i, w) in quotes.windows(2).enumerate() {
            if w[1].timestamp <= w[0].timestamp {
                return Err(RiskError::invalid_data(format!(
                    "timestamps not strictly increasing at index {}: {} !< {}",
                    i + 1,
                    w[0].timestamp,
                    w[1].timestamp
                )));
            }
        }
        let prices: Vec<f64> = quotes.iter().map(|q| q.price).collect();
        Self::from_prices(&prices)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mean(&self) -> f64 {
        stats::mean(&self.values).unwrap_or(0.0)
    }

    /// Sample variance (n−1 denominator). 0.0 for a single-return series.
    pub fn sample_variance(&self) -> f64 {
        stats::sample_variance(&self.values).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn prices_to_returns_length() {
        let prices = [100.0, 101.0, 99.0, 102.0];
        let series = ReturnSeries::from_prices(&prices).unwrap();
        assert_eq!(series.len(), prices.len() - 1);
        assert!((series.values()[0] - 1.0).abs() < 1e-12);
        assert!(series.values().iter().all(|r| r.is_finite()));
    }

    #[test]
    fn rejects_short_and_nonpositive_input() {
        assert!(matches!(
            ReturnSeries::from_prices(&[100.0]),
            Err(RiskError::InvalidData { .. })
        ));
        assert!(matches!(
            ReturnSeries::from_prices(&[100.0, -1.0, 102.0]),
            Err(RiskError::InvalidData { .. })
        ));
        assert!(matches!(
            ReturnSeries::from_prices(&[100.0, f64::NAN]),
            Err(RiskError::InvalidData { .. })
        ));
    }

    #[test]
    fn rejects_unordered_timestamps() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let quotes = [
            PricePoint { timestamp: t0, price: 100.0 },
            PricePoint { timestamp: t1, price: 101.0 },
        ];
        assert!(matches!(
            ReturnSeries::from_quotes(&quotes),
            Err(RiskError::InvalidData { .. })
        ));
    }

    #[test]
    fn quotes_in_order_accepted() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let quotes: Vec<PricePoint> = (0..5)
            .map(|i| PricePoint {
                timestamp: t0 + chrono::Duration::days(i),
                price: 100.0 + i as f64,
            })
            .collect();
        let series = ReturnSeries::from_quotes(&quotes).unwrap();
        assert_eq!(series.len(), 4);
    }
}
