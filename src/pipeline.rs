//! Ranks the fetched assets by expected return and runs the allocator over the result.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::allocator::{allocate, Allocation};
use crate::config::RunParameters;
use crate::error::Result;
use crate::market_data::AssetSeries;
use crate::metrics::AssetMetric;
use crate::ranking::{RankedAssets, ReturnTree, SortOrder};

/// An asset left out of the ranking, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedAsset {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOutcome {
    /// Metrics in request order, for the ratio table.
    pub metrics: Vec<AssetMetric>,
    /// Descending by expected return.
    pub ranked: RankedAssets,
    /// Fractions aligned with `ranked`.
    pub allocation: Allocation,
    pub skipped: Vec<SkippedAsset>,
}

impl RunOutcome {
    /// `(symbol, fraction)` for every ranked asset with a non-zero fraction.
    pub fn selections(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.ranked
            .symbols
            .iter()
            .zip(&self.allocation.fractions)
            .filter(|(_, &f)| f > 0.0)
            .map(|(s, &f)| (s.as_str(), f))
    }
}

/// Compute metrics for every series that has data, skipping the rest.
pub fn collect_metrics(series: &[AssetSeries]) -> Result<(Vec<AssetMetric>, Vec<SkippedAsset>)> {
    let mut metrics = Vec::with_capacity(series.len());
    let mut skipped = Vec::new();

    for s in series {
        let Some(prices) = s.data() else {
            warn!(symbol = %s.symbol, "no data available, skipping");
            skipped.push(SkippedAsset {
                symbol: s.symbol.clone(),
                reason: "no data available".to_string(),
            });
            continue;
        };

        match AssetMetric::from_prices(s.symbol.clone(), prices) {
            Ok(metric) => {
                debug!(
                    symbol = %metric.symbol,
                    expected_return = metric.expected_return,
                    risk = metric.risk,
                    "computed metrics"
                );
                metrics.push(metric);
            }
            Err(e) if e.is_per_asset() => {
                warn!(symbol = %s.symbol, error = %e, "skipping asset");
                skipped.push(SkippedAsset {
                    symbol: s.symbol.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok((metrics, skipped))
}

/// Full run: metrics, descending ranking, then allocation over the ranked sequence.
pub fn rank_and_allocate(series: &[AssetSeries], params: &RunParameters) -> Result<RunOutcome> {
    let (metrics, skipped) = collect_metrics(series)?;

    let tree = ReturnTree::from_metrics(metrics.iter().cloned());
    let ranked = tree.extract_ordered(SortOrder::Descending);
    debug!(assets = ranked.len(), depth = tree.depth(), "ranking built");

    let allocation = allocate(&ranked.returns, &ranked.risks, params.capacity, params.zero_risk)?;
    info!(
        ranked = ranked.len(),
        skipped = skipped.len(),
        capacity = params.capacity,
        achieved_return = allocation.achieved_return,
        "allocation complete"
    );

    Ok(RunOutcome {
        metrics,
        ranked,
        allocation,
        skipped,
    })
}
