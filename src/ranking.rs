//! Binary search tree keyed by expected return.
//!
//! Nodes live in a flat arena and refer to their children by index. The tree is never
//! rebalanced, so its shape follows insertion order; both insertion and traversal are
//! iterative and do not grow the call stack on degenerate (sorted) input.
//!
//! Tie-break: a new metric goes right only when its expected return is strictly greater
//! than the node's. Equal values nest to the left, so among equal returns the
//! later-inserted asset comes LATER in a descending walk and EARLIER in an ascending one.

use serde::Serialize;

use crate::metrics::AssetMetric;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
}

#[derive(Debug, Clone)]
struct Node {
    metric: AssetMetric,
    left: Option<usize>,
    right: Option<usize>,
}

type ChildFn = fn(&Node) -> Option<usize>;

#[derive(Debug, Clone, Default)]
pub struct ReturnTree {
    nodes: Vec<Node>,
    root: Option<usize>,
}

/// Index-aligned output of an ordered traversal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankedAssets {
    pub symbols: Vec<String>,
    pub returns: Vec<f64>,
    pub risks: Vec<f64>,
}

impl RankedAssets {
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    fn push(&mut self, metric: &AssetMetric) {
        self.symbols.push(metric.symbol.clone());
        self.returns.push(metric.expected_return);
        self.risks.push(metric.risk);
    }
}

impl ReturnTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree by inserting `metrics` in iteration order.
    pub fn from_metrics<I>(metrics: I) -> Self
    where
        I: IntoIterator<Item = AssetMetric>,
    {
        let mut tree = Self::new();
        for metric in metrics {
            tree.insert(metric);
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn insert(&mut self, metric: AssetMetric) {
        let new_idx = self.nodes.len();
        let key = metric.expected_return;
        self.nodes.push(Node {
            metric,
            left: None,
            right: None,
        });

        let Some(mut cur) = self.root else {
            self.root = Some(new_idx);
            return;
        };

        loop {
            let node = &mut self.nodes[cur];
            let slot = if key > node.metric.expected_return {
                &mut node.right
            } else {
                &mut node.left
            };
            match *slot {
                Some(next) => cur = next,
                None => {
                    *slot = Some(new_idx);
                    return;
                }
            }
        }
    }

    /// Number of nodes on the longest root-to-leaf path (0 for an empty tree).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(usize, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((idx, d)) = stack.pop() {
            max_depth = max_depth.max(d);
            let node = &self.nodes[idx];
            stack.extend(node.left.map(|c| (c, d + 1)));
            stack.extend(node.right.map(|c| (c, d + 1)));
        }
        max_depth
    }

    /// In-order walk (reverse in-order for `Descending`) into three parallel sequences.
    pub fn extract_ordered(&self, order: SortOrder) -> RankedAssets {
        let mut out = RankedAssets {
            symbols: Vec::with_capacity(self.len()),
            returns: Vec::with_capacity(self.len()),
            risks: Vec::with_capacity(self.len()),
        };

        let (first, second): (ChildFn, ChildFn) = match order {
            SortOrder::Descending => (|n: &Node| n.right, |n: &Node| n.left),
            SortOrder::Ascending => (|n: &Node| n.left, |n: &Node| n.right),
        };

        let mut stack = Vec::new();
        let mut cur = self.root;
        while cur.is_some() || !stack.is_empty() {
            while let Some(idx) = cur {
                stack.push(idx);
                cur = first(&self.nodes[idx]);
            }
            if let Some(idx) = stack.pop() {
                let node = &self.nodes[idx];
                out.push(&node.metric);
                cur = second(node);
            }
        }
        out
    }
}
