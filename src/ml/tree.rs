//! Binary decision tree over sparse rows.
//!
//! A CART classifier with Gini impurity for a single boolean label. Samples
//! carry weights (bootstrap counts from the forest); a zero-weight sample is
//! not part of the tree. At each node only the features that are non-zero for
//! some node sample can split it, so candidate features are gathered from the
//! CSR rows of the node samples instead of scanning the whole vocabulary.

use ahash::AHashMap;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{ReliefError, Result};
use crate::ml::sparse::{SparseMatrix, SparseRow};

/// Smallest impurity decrease that counts as an improvement.
const MIN_IMPURITY_DECREASE: f64 = 1e-12;

/// Tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with the weighted share of positive samples.
    Leaf { probability: f64, n_samples: usize },
    /// Internal node: `value <= threshold` goes left.
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    /// Number of non-constant features evaluated per node.
    pub max_features: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        TreeParams {
            max_depth: None,
            max_features: usize::MAX,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// A fitted decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    root: TreeNode,
    n_features: usize,
}

/// Weighted class totals of a set of samples.
#[derive(Debug, Clone, Copy, Default)]
struct ClassWeights {
    total: f64,
    positive: f64,
    count: usize,
}

impl ClassWeights {
    fn add(&mut self, weight: f64, positive: bool) {
        self.total += weight;
        if positive {
            self.positive += weight;
        }
        self.count += 1;
    }

    fn minus(self, other: ClassWeights) -> ClassWeights {
        ClassWeights {
            total: self.total - other.total,
            positive: self.positive - other.positive,
            count: self.count - other.count,
        }
    }

    fn gini(&self) -> f64 {
        if self.total <= 0.0 {
            return 0.0;
        }
        let p = self.positive / self.total;
        2.0 * p * (1.0 - p)
    }

    fn probability(&self) -> f64 {
        if self.total <= 0.0 {
            0.0
        } else {
            self.positive / self.total
        }
    }

    fn is_pure(&self) -> bool {
        self.positive <= 0.0 || self.positive >= self.total
    }
}

/// A chosen split.
#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Inputs shared by every node of one fit.
struct Builder<'a> {
    x: &'a SparseMatrix,
    y: &'a [bool],
    weights: &'a [f64],
    params: &'a TreeParams,
}

impl DecisionTree {
    /// Fit a tree to `x` and `y`, with per-sample `weights`.
    pub fn fit(
        x: &SparseMatrix,
        y: &[bool],
        weights: &[f64],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Result<Self> {
        if x.n_rows() != y.len() || y.len() != weights.len() {
            return Err(ReliefError::fit(format!(
                "tree input shapes differ: {} rows, {} labels, {} weights",
                x.n_rows(),
                y.len(),
                weights.len()
            )));
        }

        let samples: Vec<usize> = (0..y.len()).filter(|&i| weights[i] > 0.0).collect();
        if samples.is_empty() {
            return Err(ReliefError::fit("tree has no samples with positive weight"));
        }

        let builder = Builder {
            x,
            y,
            weights,
            params,
        };
        let root = builder.build(samples, 0, rng);

        Ok(DecisionTree {
            root,
            n_features: x.n_cols(),
        })
    }

    /// Probability of the positive class for one row.
    pub fn predict_row(&self, row: SparseRow<'_>) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { probability, .. } => return *probability,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row.get(*feature) <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        depth(&self.root)
    }

    pub fn n_leaves(&self) -> usize {
        fn leaves(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => leaves(left) + leaves(right),
            }
        }
        leaves(&self.root)
    }
}

impl Builder<'_> {
    fn totals(&self, samples: &[usize]) -> ClassWeights {
        let mut totals = ClassWeights::default();
        for &i in samples {
            totals.add(self.weights[i], self.y[i]);
        }
        totals
    }

    fn build(&self, samples: Vec<usize>, depth: usize, rng: &mut StdRng) -> TreeNode {
        let totals = self.totals(&samples);
        let leaf = TreeNode::Leaf {
            probability: totals.probability(),
            n_samples: samples.len(),
        };

        let should_stop = totals.is_pure()
            || self.params.max_depth.is_some_and(|d| depth >= d)
            || samples.len() < self.params.min_samples_split
            || samples.len() < 2 * self.params.min_samples_leaf;
        if should_stop {
            return leaf;
        }

        let Some(split) = self.find_best_split(&samples, totals, rng) else {
            return leaf;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&i| self.x.row(i).get(split.feature) <= split.threshold);

        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build(left, depth + 1, rng)),
            right: Box::new(self.build(right, depth + 1, rng)),
        }
    }

    /// Scan shuffled candidate features until `max_features` non-constant
    /// ones have been evaluated.
    fn find_best_split(
        &self,
        samples: &[usize],
        totals: ClassWeights,
        rng: &mut StdRng,
    ) -> Option<Split> {
        let mut by_feature: AHashMap<usize, Vec<(f64, usize)>> = AHashMap::new();
        for &i in samples {
            for (col, value) in self.x.row(i).iter() {
                by_feature.entry(col).or_default().push((value, i));
            }
        }

        let mut features: Vec<usize> = by_feature.keys().copied().collect();
        features.sort_unstable();
        features.shuffle(rng);

        let parent_impurity = totals.gini();
        let mut best: Option<Split> = None;
        let mut evaluated = 0;

        for feature in features {
            if evaluated >= self.params.max_features {
                break;
            }
            let Some(entries) = by_feature.get(&feature) else {
                continue;
            };
            if self.is_constant(entries, samples.len()) {
                continue;
            }
            evaluated += 1;

            if let Some(split) = self.best_threshold(feature, entries, totals, parent_impurity) {
                if best.is_none_or(|b| split.gain > b.gain) {
                    best = Some(split);
                }
            }
        }

        best
    }

    fn is_constant(&self, entries: &[(f64, usize)], n_samples: usize) -> bool {
        let has_zeros = entries.len() < n_samples;
        let first = entries[0].0;
        let all_equal = entries.iter().all(|&(v, _)| v == first);
        all_equal && (!has_zeros || first == 0.0)
    }

    /// Best threshold for one feature; samples missing from `entries` are zero.
    fn best_threshold(
        &self,
        feature: usize,
        entries: &[(f64, usize)],
        totals: ClassWeights,
        parent_impurity: f64,
    ) -> Option<Split> {
        let mut stored = ClassWeights::default();
        let mut points: Vec<(f64, ClassWeights)> = Vec::with_capacity(entries.len() + 1);
        for &(value, i) in entries.iter() {
            let mut point = ClassWeights::default();
            point.add(self.weights[i], self.y[i]);
            stored.add(self.weights[i], self.y[i]);
            points.push((value, point));
        }
        let zeros = totals.minus(stored);
        if zeros.count > 0 {
            points.push((0.0, zeros));
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));

        let min_leaf = self.params.min_samples_leaf;
        let mut left = ClassWeights::default();
        let mut best: Option<Split> = None;

        for k in 0..points.len() - 1 {
            let (value, point) = points[k];
            left.total += point.total;
            left.positive += point.positive;
            left.count += point.count;

            let next = points[k + 1].0;
            if next <= value {
                continue;
            }
            let right = totals.minus(left);
            if left.count < min_leaf || right.count < min_leaf {
                continue;
            }

            let child_impurity = (left.total * left.gini() + right.total * right.gini()) / totals.total;
            let gain = parent_impurity - child_impurity;
            if gain > MIN_IMPURITY_DECREASE && best.is_none_or(|b| gain > b.gain) {
                let mut threshold = (value + next) / 2.0;
                if threshold >= next {
                    threshold = value;
                }
                best = Some(Split {
                    feature,
                    threshold,
                    gain,
                });
            }
        }

        best
    }
}
