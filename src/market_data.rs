//! Daily adjusted-close price series for the requested symbols.
//!
//! Two sources:
//! - Yahoo Finance chart API (one request per symbol, fetched concurrently)
//! - a local JSON price file `{ "SYMBOL": [p0, p1, ...] }` for offline runs
//!
//! Either way the result is one `AssetSeries` per requested symbol, in request order.
//! A symbol with no data carries `prices: None`; deciding what to do with it is up to
//! the caller.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::{RankerError, Result};

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("quant_ranker/", env!("CARGO_PKG_VERSION"));

/// Price history for one requested symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSeries {
    pub symbol: String,
    pub prices: Option<Vec<f64>>,
}

impl AssetSeries {
    pub fn new(symbol: impl Into<String>, prices: Vec<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            prices: Some(prices),
        }
    }

    pub fn missing(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            prices: None,
        }
    }

    /// The series, or `None` when nothing usable came back.
    pub fn data(&self) -> Option<&[f64]> {
        self.prices.as_deref().filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(YAHOO_CHART_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Daily adjusted closes for `symbol` between `start` and `end`.
    /// `Ok(None)` when the response parses but holds no prices.
    pub async fn fetch_adjusted_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<Vec<f64>>> {
        let url = format!(
            "{}/{}?period1={}&period2={}&interval=1d&events=div%2Csplit",
            self.base_url,
            symbol,
            unix_timestamp(start),
            unix_timestamp(end)
        );
        debug!(%symbol, %url, "requesting chart");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            warn!(%symbol, %status, "chart request failed");
            return Ok(None);
        }

        let json: Value = serde_json::from_str(&text)?;
        Ok(extract_adjusted_closes(&json).filter(|p| !p.is_empty()))
    }

    /// Fetch every symbol concurrently. Failures become "no data" for that symbol only.
    pub async fn fetch_all(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<AssetSeries> {
        let mut tasks = JoinSet::new();
        for (idx, symbol) in symbols.iter().enumerate() {
            let client = self.clone();
            let symbol = symbol.clone();
            tasks.spawn(async move {
                let result = client.fetch_adjusted_closes(&symbol, start, end).await;
                (idx, symbol, result)
            });
        }

        let mut slots: Vec<Option<Vec<f64>>> = vec![None; symbols.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, symbol, Ok(prices))) => {
                    if prices.is_none() {
                        warn!(%symbol, "no price data returned");
                    }
                    slots[idx] = prices;
                }
                Ok((_, symbol, Err(e))) => warn!(%symbol, error = %e, "failed to download prices"),
                Err(e) => warn!(error = %e, "price download task aborted"),
            }
        }

        let series: Vec<AssetSeries> = symbols
            .iter()
            .zip(slots)
            .map(|(symbol, prices)| AssetSeries {
                symbol: symbol.clone(),
                prices,
            })
            .collect();
        info!(
            requested = symbols.len(),
            received = series.iter().filter(|s| s.data().is_some()).count(),
            "price download complete"
        );
        series
    }
}

fn unix_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Pull the adjusted-close column out of a chart response, falling back to raw closes.
/// Null points (non-trading days, halts) are dropped.
pub fn extract_adjusted_closes(json: &Value) -> Option<Vec<f64>> {
    let result = json["chart"]["result"].as_array()?.first()?;
    let indicators = &result["indicators"];

    let column = indicators["adjclose"]
        .as_array()
        .and_then(|a| a.first())
        .and_then(|a| a["adjclose"].as_array())
        .or_else(|| {
            indicators["quote"]
                .as_array()
                .and_then(|q| q.first())
                .and_then(|q| q["close"].as_array())
        })?;

    Some(column.iter().filter_map(|v| v.as_f64()).collect())
}

/// Load a `{ "SYMBOL": [prices...] }` file.
pub fn load_price_file(path: impl AsRef<Path>) -> Result<HashMap<String, Vec<f64>>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        RankerError::invalid_config(format!(
            "failed to read price file '{}': {}",
            path.display(),
            e
        ))
    })?;
    let raw: HashMap<String, Vec<f64>> = serde_json::from_str(&contents)?;
    Ok(raw
        .into_iter()
        .map(|(symbol, prices)| (symbol.to_ascii_uppercase(), prices))
        .collect())
}

/// Look up each requested symbol in a loaded price file, preserving request order.
pub fn series_from_prices(
    symbols: &[String],
    prices: &HashMap<String, Vec<f64>>,
) -> Vec<AssetSeries> {
    symbols
        .iter()
        .map(|symbol| match prices.get(symbol) {
            Some(p) => AssetSeries::new(symbol.clone(), p.clone()),
            None => AssetSeries::missing(symbol.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_extract_prefers_adjclose() {
        let body = json!({
            "chart": {
                "result": [{
                    "timestamp": [1, 2, 3],
                    "indicators": {
                        "quote": [{ "close": [10.0, 11.0, 12.0] }],
                        "adjclose": [{ "adjclose": [9.5, null, 11.5] }]
                    }
                }],
                "error": null
            }
        });
        assert_eq!(extract_adjusted_closes(&body), Some(vec![9.5, 11.5]));
    }

    #[test]
    fn test_extract_falls_back_to_close() {
        let body = json!({
            "chart": { "result": [{ "indicators": { "quote": [{ "close": [1.0, 2.0] }] } }] }
        });
        assert_eq!(extract_adjusted_closes(&body), Some(vec![1.0, 2.0]));
    }

    #[test]
    fn test_extract_error_response() {
        let body = json!({
            "chart": { "result": null, "error": { "code": "Not Found" } }
        });
        assert_eq!(extract_adjusted_closes(&body), None);
    }

    #[test]
    fn test_unix_timestamp() {
        let date = NaiveDate::from_ymd_opt(2023, 5, 10).unwrap();
        assert_eq!(unix_timestamp(date), 1_683_676_800);
    }

    #[test]
    fn test_series_data() {
        assert_eq!(AssetSeries::new("A", vec![1.0]).data(), Some(&[1.0][..]));
        assert_eq!(AssetSeries::new("A", vec![]).data(), None);
        assert_eq!(AssetSeries::missing("A").data(), None);
    }

    #[test]
    fn test_price_file_lookup_keeps_request_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"msft": [1.0, 2.0], "AAPL": [3.0, 4.0, 5.0]}}"#).unwrap();

        let prices = load_price_file(file.path()).unwrap();
        let symbols = vec!["AAPL".to_string(), "TSLA".to_string(), "MSFT".to_string()];
        let series = series_from_prices(&symbols, &prices);

        assert_eq!(series.len(), 3);
        assert_eq!(series[0], AssetSeries::new("AAPL", vec![3.0, 4.0, 5.0]));
        assert_eq!(series[1], AssetSeries::missing("TSLA"));
        assert_eq!(series[2].data(), Some(&[1.0, 2.0][..]));
    }

    #[test]
    fn test_missing_price_file() {
        let err = load_price_file("/nonexistent/prices.json").unwrap_err();
        assert!(matches!(err, RankerError::InvalidConfig { .. }));
    }
}
