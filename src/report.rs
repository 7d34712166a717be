//! Presentation of a run: ranked table, ratio table, selected fractions.

use std::fmt::Write;

use serde::Serialize;

use crate::metrics::{sharpe_ratio, treynor_ratio};
use crate::pipeline::{RunOutcome, SkippedAsset};

/// Beta assumed for every asset when computing the Treynor ratio.
pub const ASSUMED_BETA: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    pub symbol: String,
    pub expected_return: f64,
    pub risk: f64,
    /// `None` for zero-risk assets.
    pub sharpe_ratio: Option<f64>,
    pub treynor_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub symbol: String,
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub risk_free_rate: f64,
    /// Request order.
    pub metrics: Vec<RankedRow>,
    /// Descending by expected return.
    pub ranked: Vec<RankedRow>,
    pub selections: Vec<Selection>,
    pub max_expected_return: f64,
    pub skipped: Vec<SkippedAsset>,
}

fn row(symbol: &str, expected_return: f64, risk: f64, risk_free_rate: f64) -> RankedRow {
    RankedRow {
        symbol: symbol.to_string(),
        expected_return,
        risk,
        sharpe_ratio: sharpe_ratio(expected_return, risk, risk_free_rate),
        treynor_ratio: treynor_ratio(expected_return, risk_free_rate, ASSUMED_BETA),
    }
}

impl Report {
    pub fn build(outcome: &RunOutcome, risk_free_rate: f64) -> Self {
        let metrics = outcome
            .metrics
            .iter()
            .map(|m| row(&m.symbol, m.expected_return, m.risk, risk_free_rate))
            .collect();

        let ranked = &outcome.ranked;
        let ranked_rows = ranked
            .symbols
            .iter()
            .zip(&ranked.returns)
            .zip(&ranked.risks)
            .map(|((s, &er), &risk)| row(s, er, risk, risk_free_rate))
            .collect();

        let selections = outcome
            .selections()
            .map(|(symbol, fraction)| Selection {
                symbol: symbol.to_string(),
                fraction,
            })
            .collect();

        Self {
            risk_free_rate,
            metrics,
            ranked: ranked_rows,
            selections,
            max_expected_return: outcome.allocation.achieved_return,
            skipped: outcome.skipped.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();

        for s in &self.skipped {
            let _ = writeln!(out, "Warning: {} skipped ({})", s.symbol, s.reason);
        }
        if !self.skipped.is_empty() {
            out.push('\n');
        }

        if !self.metrics.is_empty() {
            let _ = writeln!(out, "Metrics (risk-free rate {:.4}):", self.risk_free_rate);
            let _ = writeln!(
                out,
                "{:<8} {:>12} {:>10} {:>10} {:>10}",
                "Symbol", "Exp.Return", "Risk", "Sharpe", "Treynor"
            );
            for r in &self.metrics {
                let sharpe = r
                    .sharpe_ratio
                    .map(|v| format!("{:.4}", v))
                    .unwrap_or_else(|| "n/a".to_string());
                let _ = writeln!(
                    out,
                    "{:<8} {:>12.4} {:>10.4} {:>10} {:>10.4}",
                    r.symbol, r.expected_return, r.risk, sharpe, r.treynor_ratio
                );
            }
            out.push('\n');
        }

        let _ = writeln!(out, "Companies sorted by Expected Return:");
        for r in &self.ranked {
            let _ = writeln!(
                out,
                "{} - Expected Return: {:.4}, Risk: {:.4}",
                r.symbol, r.expected_return, r.risk
            );
        }

        let _ = writeln!(out, "\nSelected Companies and Fractions:");
        for s in &self.selections {
            let _ = writeln!(out, "{} - Fraction: {:.4}", s.symbol, s.fraction);
        }

        let _ = writeln!(out, "\nMaximum Expected Return: {:.4}", self.max_expected_return);
        out
    }
}
