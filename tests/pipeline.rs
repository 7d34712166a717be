//! End-to-end runs through metrics, ranking and allocation.

use quant_ranker::config::RunParameters;
use quant_ranker::{
    rank_and_allocate, AssetSeries, RankerError, Report, ReturnTree, SortOrder, ZeroRiskPolicy,
};

const EPS: f64 = 1e-9;

/// A series whose daily returns alternate between `up` and `down`.
fn zigzag(start: f64, up: f64, down: f64, n: usize) -> Vec<f64> {
    let mut prices = vec![start];
    for i in 1..n {
        let r = if i % 2 == 1 { up } else { down };
        let last = prices[i - 1];
        prices.push(last * (1.0 + r));
    }
    prices
}

fn params(capacity: f64) -> RunParameters {
    RunParameters {
        capacity,
        ..Default::default()
    }
}

fn sample_series() -> Vec<AssetSeries> {
    vec![
        AssetSeries::new("SLOW", zigzag(100.0, 0.010, -0.006, 21)),
        AssetSeries::new("FAST", zigzag(50.0, 0.040, -0.020, 21)),
        AssetSeries::missing("GONE"),
        AssetSeries::new("ONE", vec![12.0]),
        AssetSeries::new("FLAT", zigzag(30.0, 0.002, 0.000, 21)),
    ]
}

#[test]
fn test_ranked_descending_and_skips_reported() {
    let outcome = rank_and_allocate(&sample_series(), &params(0.04)).unwrap();

    assert_eq!(outcome.ranked.symbols, vec!["FAST", "SLOW", "FLAT"]);
    assert!(outcome.ranked.returns.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(outcome.ranked.returns.len(), 3);
    assert_eq!(outcome.ranked.risks.len(), 3);
    assert_eq!(outcome.allocation.fractions.len(), 3);
    assert_eq!(outcome.metrics.len(), 3);
    assert_eq!(outcome.metrics[0].symbol, "SLOW");

    let skipped: Vec<&str> = outcome.skipped.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(skipped, vec!["GONE", "ONE"]);
    assert!(outcome.skipped[1].reason.contains("Insufficient data"));
}

#[test]
fn test_allocation_respects_capacity() {
    let series = sample_series();
    let large = rank_and_allocate(&series, &params(10.0)).unwrap();
    assert!(large.allocation.fractions.iter().all(|&f| f == 1.0));
    let total: f64 = large.ranked.returns.iter().sum();
    assert!((large.allocation.achieved_return - total).abs() < EPS);

    let zero = rank_and_allocate(&series, &params(0.0)).unwrap();
    assert_eq!(zero.allocation.achieved_return, 0.0);
    assert!(zero.allocation.fractions.iter().all(|&f| f == 0.0));

    let tight = rank_and_allocate(&series, &params(0.01)).unwrap();
    let used = tight.allocation.used_capacity(&tight.ranked.risks);
    assert!((used - 0.01).abs() < EPS);
    assert!(tight.selections().count() >= 1);
}

#[test]
fn test_zero_risk_asset_does_not_crash() {
    // Flat prices give all-zero returns, so risk is exactly zero.
    let steady = AssetSeries::new("STEADY", vec![100.0, 100.0, 100.0, 100.0]);
    let series = vec![steady.clone()];

    let outcome = rank_and_allocate(&series, &params(0.05)).unwrap();
    assert_eq!(outcome.ranked.risks, vec![0.0]);
    assert_eq!(outcome.allocation.fractions, vec![1.0]);

    let fail_fast = RunParameters {
        zero_risk: ZeroRiskPolicy::FailFast,
        ..params(0.05)
    };
    let err = rank_and_allocate(&series, &fail_fast).unwrap_err();
    assert!(matches!(err, RankerError::DivisionByZero { .. }));

    let mixed = vec![
        AssetSeries::new("RISKY", zigzag(10.0, 0.05, -0.01, 11)),
        steady,
    ];
    let outcome = rank_and_allocate(&mixed, &params(0.001)).unwrap();
    let steady_idx = outcome.ranked.symbols.iter().position(|s| s == "STEADY").unwrap();
    assert_eq!(outcome.allocation.fractions[steady_idx], 1.0);
}

#[test]
fn test_negative_capacity_fails_whole_run() {
    let err = rank_and_allocate(&sample_series(), &params(-1.0)).unwrap_err();
    assert!(matches!(err, RankerError::InvalidCapacity(_)));
}

#[test]
fn test_equal_returns_follow_tree_order() {
    let prices = zigzag(100.0, 0.03, -0.01, 11);
    let series = vec![
        AssetSeries::new("A", prices.clone()),
        AssetSeries::new("B", prices.clone()),
        AssetSeries::new("C", prices),
    ];
    let outcome = rank_and_allocate(&series, &params(1.0)).unwrap();
    assert_eq!(outcome.ranked.symbols, vec!["A", "B", "C"]);

    let tree = ReturnTree::from_metrics(outcome.metrics.clone());
    let asc = tree.extract_ordered(SortOrder::Ascending);
    assert_eq!(asc.symbols, vec!["C", "B", "A"]);
}

#[test]
fn test_report_from_run() {
    let outcome = rank_and_allocate(&sample_series(), &params(0.02)).unwrap();
    let report = Report::build(&outcome, 0.05);

    assert_eq!(report.ranked.len(), 3);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.max_expected_return, outcome.allocation.achieved_return);
    assert!(report.render_text().contains("Companies sorted by Expected Return:"));
}
