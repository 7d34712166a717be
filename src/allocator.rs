//! Fractional-capacity greedy allocation.
//!
//! Indices are ranked by efficiency ratio (`return / risk`, highest first) and taken in
//! that order while their risk fits the remaining capacity. The first index that does not
//! fit is taken fractionally and the walk stops there, even if later indices would fit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RankerError, Result};

/// How `allocate` treats an asset whose risk is exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZeroRiskPolicy {
    /// Treat the ratio as unbounded: ranked first and taken fully.
    #[default]
    PriorityPick,
    /// Reject the whole call with `DivisionByZero`.
    FailFast,
}

impl FromStr for ZeroRiskPolicy {
    type Err = RankerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "priority" | "priority-pick" => Ok(Self::PriorityPick),
            "fail" | "fail-fast" => Ok(Self::FailFast),
            other => Err(RankerError::invalid_config(format!(
                "unknown zero-risk policy '{}' (expected 'priority' or 'fail')",
                other
            ))),
        }
    }
}

impl fmt::Display for ZeroRiskPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PriorityPick => write!(f, "priority-pick"),
            Self::FailFast => write!(f, "fail-fast"),
        }
    }
}

/// Result of one allocator pass. `fractions` is aligned to the input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Allocation {
    pub achieved_return: f64,
    pub fractions: Vec<f64>,
}

impl Allocation {
    /// Risk budget consumed by this allocation.
    pub fn used_capacity(&self, risks: &[f64]) -> f64 {
        self.fractions.iter().zip(risks).map(|(f, r)| f * r).sum()
    }
}

fn efficiency_ratios(returns: &[f64], risks: &[f64], policy: ZeroRiskPolicy) -> Result<Vec<f64>> {
    returns
        .iter()
        .zip(risks)
        .enumerate()
        .map(|(i, (&ret, &risk))| {
            if risk != 0.0 {
                return Ok(ret / risk);
            }
            match policy {
                ZeroRiskPolicy::PriorityPick => Ok(f64::INFINITY),
                ZeroRiskPolicy::FailFast => Err(RankerError::division_by_zero(format!(
                    "efficiency ratio for index {} (risk is zero)",
                    i
                ))),
            }
        })
        .collect()
}

/// Greedily fill `capacity` with the index-aligned `(returns, risks)` pairs.
///
/// Fails the whole call on mismatched lengths or a negative/non-finite capacity.
pub fn allocate(
    returns: &[f64],
    risks: &[f64],
    capacity: f64,
    policy: ZeroRiskPolicy,
) -> Result<Allocation> {
    if returns.len() != risks.len() {
        return Err(RankerError::LengthMismatch {
            expected: returns.len(),
            actual: risks.len(),
        });
    }
    if !capacity.is_finite() || capacity < 0.0 {
        return Err(RankerError::InvalidCapacity(capacity));
    }

    let ratios = efficiency_ratios(returns, risks, policy)?;

    // Stable: equal ratios keep input order.
    let mut order: Vec<usize> = (0..returns.len()).collect();
    order.sort_by(|&a, &b| ratios[b].total_cmp(&ratios[a]));

    let mut remaining = capacity;
    let mut achieved_return = 0.0;
    let mut fractions = vec![0.0; returns.len()];

    for i in order {
        if risks[i] <= remaining {
            fractions[i] = 1.0;
            achieved_return += returns[i];
            remaining -= risks[i];
            debug!(index = i, ratio = ratios[i], remaining, "took full position");
        } else {
            fractions[i] = remaining / risks[i];
            achieved_return += returns[i] * fractions[i];
            debug!(index = i, ratio = ratios[i], fraction = fractions[i], "took partial position, stopping");
            break;
        }
    }

    Ok(Allocation {
        achieved_return,
        fractions,
    })
}
