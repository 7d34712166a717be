//! Per-asset return metrics computed from an adjusted-close price series.
//!
//! Expected return is the arithmetic mean of period-over-period percentage changes;
//! risk is the Bessel-corrected standard deviation of the same changes.

use serde::Serialize;

use crate::error::{RankerError, Result};

/// Minimum number of prices needed to produce one return.
pub const MIN_PRICES: usize = 2;

/// Return and risk for one asset. Built once per asset, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetMetric {
    pub symbol: String,
    pub expected_return: f64,
    pub risk: f64,
}

impl AssetMetric {
    pub fn new(symbol: impl Into<String>, expected_return: f64, risk: f64) -> Self {
        Self {
            symbol: symbol.into(),
            expected_return,
            risk,
        }
    }

    /// Compute the metric for `symbol` directly from its price series.
    pub fn from_prices(symbol: impl Into<String>, prices: &[f64]) -> Result<Self> {
        let (expected_return, risk) = compute_metrics(prices)?;
        Ok(Self::new(symbol, expected_return, risk))
    }
}

/// Period-over-period percentage changes, length `prices.len() - 1`.
pub fn daily_returns(prices: &[f64]) -> Result<Vec<f64>> {
    if prices.len() < MIN_PRICES {
        return Err(RankerError::insufficient_data(MIN_PRICES, prices.len()));
    }
    if let Some((index, &value)) = prices
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p <= 0.0)
    {
        return Err(RankerError::InvalidPrice { index, value });
    }

    Ok(prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect())
}

/// Returns `(expected_return, risk)` for a price series.
///
/// A two-point series yields a single return whose sample deviation has no degrees
/// of freedom; risk is reported as 0.0 in that case.
pub fn compute_metrics(prices: &[f64]) -> Result<(f64, f64)> {
    let returns = daily_returns(prices)?;
    let mean = mean(&returns);
    Ok((mean, sample_std(&returns, mean)))
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Excess return per unit of risk. `None` for a zero-risk asset.
pub fn sharpe_ratio(expected_return: f64, risk: f64, risk_free_rate: f64) -> Option<f64> {
    if risk == 0.0 {
        return None;
    }
    Some((expected_return - risk_free_rate) / risk)
}

/// Excess return per unit of market beta.
pub fn treynor_ratio(expected_return: f64, risk_free_rate: f64, beta: f64) -> f64 {
    (expected_return - risk_free_rate) / beta
}
