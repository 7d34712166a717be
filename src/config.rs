//! Run configuration: symbol list, observation window, risk budget.
//!
//! Values come from an optional JSON file and are then overridden field by field by
//! whatever the command line supplies. `RunConfig::resolve` validates the merged result.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::allocator::ZeroRiskPolicy;
use crate::error::{RankerError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const DEFAULT_SYMBOLS: &[&str] = &["AAPL", "MSFT", "AMZN", "GOOGL"];
pub const DEFAULT_START: &str = "2023-05-10";
pub const DEFAULT_END: &str = "2024-05-10";
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.05;
pub const DEFAULT_CAPACITY: f64 = 0.04;

/// Large-cap symbols offered by default.
pub const DEFAULT_UNIVERSE: &[&str] = &[
    "AAPL", "MSFT", "AMZN", "GOOGL", "GOOG", "TSLA", "V", "JNJ",
    "WMT", "JPM", "MA", "PG", "NVDA", "HD", "PYPL", "DIS", "VZ", "KO",
    "NFLX", "PFE", "MRK", "T", "PEP", "INTC", "CMCSA", "XOM", "NKE", "CSCO",
    "ABT", "ABBV", "ORCL", "ACN", "CVX", "MDT", "UNH", "IBM", "QCOM", "COST",
    "HON", "MCD", "CAT", "MMM", "TXN", "GILD", "BA", "LLY", "AMGN", "SBUX",
];

static SYMBOL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z][A-Z0-9.]{0,9}$").expect("symbol pattern is valid")
});

/// Raw, partially specified configuration as read from a file or the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub symbols: Option<Vec<String>>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub risk_free_rate: Option<f64>,
    pub capacity: Option<f64>,
    pub zero_risk: Option<ZeroRiskPolicy>,
}

/// Inputs to the ranking and allocation core.
#[derive(Debug, Clone, PartialEq)]
pub struct RunParameters {
    /// Total risk budget, finite and >= 0.
    pub capacity: f64,
    /// Passed through to the report; the allocator never reads it.
    pub risk_free_rate: f64,
    pub zero_risk: ZeroRiskPolicy,
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            zero_risk: ZeroRiskPolicy::default(),
        }
    }
}

/// Fully validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub params: RunParameters,
}

impl RunConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            RankerError::invalid_config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Fields set in `other` replace the ones in `self`.
    pub fn merge(self, other: RunConfig) -> Self {
        Self {
            symbols: other.symbols.or(self.symbols),
            start_date: other.start_date.or(self.start_date),
            end_date: other.end_date.or(self.end_date),
            risk_free_rate: other.risk_free_rate.or(self.risk_free_rate),
            capacity: other.capacity.or(self.capacity),
            zero_risk: other.zero_risk.or(self.zero_risk),
        }
    }

    pub fn resolve(self) -> Result<ResolvedConfig> {
        let raw_symbols = self
            .symbols
            .unwrap_or_else(|| DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect());
        let symbols = normalize_symbols(&raw_symbols)?;

        let start_date = parse_date(self.start_date.as_deref().unwrap_or(DEFAULT_START))?;
        let end_date = parse_date(self.end_date.as_deref().unwrap_or(DEFAULT_END))?;
        if start_date >= end_date {
            return Err(RankerError::invalid_config(format!(
                "start date {} must be before end date {}",
                start_date, end_date
            )));
        }

        let capacity = self.capacity.unwrap_or(DEFAULT_CAPACITY);
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(RankerError::InvalidCapacity(capacity));
        }
        let risk_free_rate = self.risk_free_rate.unwrap_or(DEFAULT_RISK_FREE_RATE);
        if !risk_free_rate.is_finite() {
            return Err(RankerError::invalid_config("risk-free rate must be finite"));
        }

        Ok(ResolvedConfig {
            symbols,
            start_date,
            end_date,
            params: RunParameters {
                capacity,
                risk_free_rate,
                zero_risk: self.zero_risk.unwrap_or_default(),
            },
        })
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)?)
}

/// Upper-case, validate and deduplicate symbols, keeping first occurrence order.
pub fn normalize_symbols<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>> {
    let mut symbols: Vec<String> = Vec::with_capacity(raw.len());
    for s in raw {
        let symbol = s.as_ref().trim().to_ascii_uppercase();
        if !SYMBOL_RE.is_match(&symbol) {
            return Err(RankerError::InvalidSymbol(s.as_ref().to_string()));
        }
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    if symbols.is_empty() {
        return Err(RankerError::invalid_config("symbol list is empty"));
    }
    Ok(symbols)
}
