//! Ranks candidate assets by historical expected return and allocates a risk budget
//! across them with a fractional greedy selection.
//!
//! - `metrics` turns a price series into expected return and risk
//! - `ranking` orders assets with an unbalanced binary search tree
//! - `allocator` fills the risk capacity by efficiency ratio
//! - `pipeline` wires the three together for a batch of fetched series

pub mod allocator;
pub mod config;
pub mod error;
pub mod market_data;
pub mod metrics;
pub mod pipeline;
pub mod ranking;
pub mod report;

pub use allocator::{allocate, Allocation, ZeroRiskPolicy};
pub use config::{ResolvedConfig, RunConfig, RunParameters};
pub use error::{RankerError, Result};
pub use market_data::AssetSeries;
pub use metrics::{compute_metrics, AssetMetric};
pub use pipeline::{rank_and_allocate, RunOutcome, SkippedAsset};
pub use ranking::{RankedAssets, ReturnTree, SortOrder};
pub use report::Report;
