//! Random forest classifier for one boolean label.
//!
//! Each tree is grown on a bootstrap sample of the rows (drawn as per-row
//! counts, used as sample weights) and considers a random subset of the
//! features at every node. Tree `t` is seeded with `random_state + t`, so a
//! forest is fully determined by its parameters and training data.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{ReliefError, Result};
use crate::ml::sparse::SparseMatrix;
use crate::ml::tree::{DecisionTree, TreeParams};

/// How many features each split considers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`
    #[default]
    Sqrt,
    /// `floor(log2(n_features))`
    Log2,
    /// A fixed count, capped at `n_features`.
    Fixed(usize),
    /// `floor(fraction * n_features)`
    Fraction(f64),
    /// Every feature.
    All,
}

impl MaxFeatures {
    /// Number of features per split for `n_features` columns (at least one).
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = n_features as f64;
        let resolved = match *self {
            MaxFeatures::Sqrt => n.sqrt().floor() as usize,
            MaxFeatures::Log2 => {
                if n_features == 0 {
                    0
                } else {
                    n.log2().floor() as usize
                }
            }
            MaxFeatures::Fixed(k) => k.min(n_features),
            MaxFeatures::Fraction(f) => (f * n).floor() as usize,
            MaxFeatures::All => n_features,
        };
        resolved.max(1)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            MaxFeatures::Fixed(0) => Err(ReliefError::config("max_features must be at least 1")),
            MaxFeatures::Fraction(f) if !(f > 0.0 && f <= 1.0) => Err(ReliefError::config(
                format!("max_features fraction must be in (0, 1], got {f}"),
            )),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for MaxFeatures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaxFeatures::Sqrt => write!(f, "sqrt"),
            MaxFeatures::Log2 => write!(f, "log2"),
            MaxFeatures::Fixed(k) => write!(f, "{k}"),
            MaxFeatures::Fraction(x) => write!(f, "{x}"),
            MaxFeatures::All => write!(f, "all"),
        }
    }
}

/// Random forest hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub max_features: MaxFeatures,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub bootstrap: bool,
    pub random_state: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        ForestParams {
            n_estimators: 10,
            max_depth: None,
            max_features: MaxFeatures::Sqrt,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            random_state: 13,
        }
    }
}

impl ForestParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(ReliefError::config("n_estimators must be at least 1"));
        }
        if self.max_depth == Some(0) {
            return Err(ReliefError::config("max_depth must be at least 1"));
        }
        if self.min_samples_split < 2 {
            return Err(ReliefError::config("min_samples_split must be at least 2"));
        }
        if self.min_samples_leaf == 0 {
            return Err(ReliefError::config("min_samples_leaf must be at least 1"));
        }
        self.max_features.validate()
    }

    fn tree_params(&self, n_features: usize) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            max_features: self.max_features.resolve(n_features),
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
        }
    }
}

impl std::fmt::Display for ForestParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let depth = self
            .max_depth
            .map_or_else(|| "none".to_string(), |d| d.to_string());
        write!(
            f,
            "n_estimators={}, max_depth={depth}, max_features={}, min_samples_split={}, min_samples_leaf={}",
            self.n_estimators, self.max_features, self.min_samples_split, self.min_samples_leaf
        )
    }
}

/// The fitted state of a forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForestModel {
    /// The training column had a single value; always predicts it.
    Constant { positive: bool },
    /// An ensemble of trees.
    Trees(Vec<DecisionTree>),
}

/// Random forest for a single boolean label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    params: ForestParams,
    model: Option<ForestModel>,
}

impl RandomForestClassifier {
    pub fn new(params: ForestParams) -> Self {
        RandomForestClassifier {
            params,
            model: None,
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn model(&self) -> Option<&ForestModel> {
        self.model.as_ref()
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    /// Whether the fitted forest is a constant predictor.
    pub fn is_constant(&self) -> bool {
        matches!(self.model, Some(ForestModel::Constant { .. }))
    }

    /// Number of fitted trees (zero for a constant predictor).
    pub fn n_trees(&self) -> usize {
        match &self.model {
            Some(ForestModel::Trees(trees)) => trees.len(),
            _ => 0,
        }
    }

    pub fn fit(&mut self, x: &SparseMatrix, y: &[bool]) -> Result<()> {
        self.params.validate()?;
        if x.n_rows() != y.len() {
            return Err(ReliefError::fit(format!(
                "forest got {} rows and {} labels",
                x.n_rows(),
                y.len()
            )));
        }
        if y.is_empty() {
            return Err(ReliefError::fit("forest cannot be fit on zero rows"));
        }

        let first = y[0];
        if y.iter().all(|&label| label == first) {
            self.model = Some(ForestModel::Constant { positive: first });
            return Ok(());
        }

        let n_samples = y.len();
        let tree_params = self.params.tree_params(x.n_cols());
        let mut trees = Vec::with_capacity(self.params.n_estimators);

        for t in 0..self.params.n_estimators {
            let mut rng = StdRng::seed_from_u64(self.params.random_state.wrapping_add(t as u64));
            let weights = if self.params.bootstrap {
                let mut counts = vec![0.0; n_samples];
                for _ in 0..n_samples {
                    counts[rng.random_range(0..n_samples)] += 1.0;
                }
                counts
            } else {
                vec![1.0; n_samples]
            };

            trees.push(DecisionTree::fit(x, y, &weights, &tree_params, &mut rng)?);
        }

        debug!(
            "Fitted {} trees (max_features={}, mean depth {:.1})",
            trees.len(),
            tree_params.max_features,
            trees.iter().map(DecisionTree::depth).sum::<usize>() as f64 / trees.len() as f64
        );
        self.model = Some(ForestModel::Trees(trees));
        Ok(())
    }

    /// Mean positive-class probability per row.
    pub fn predict_proba(&self, x: &SparseMatrix) -> Result<Vec<f64>> {
        match &self.model {
            None => Err(ReliefError::not_fitted("random forest")),
            Some(ForestModel::Constant { positive }) => {
                let p = if *positive { 1.0 } else { 0.0 };
                Ok(vec![p; x.n_rows()])
            }
            Some(ForestModel::Trees(trees)) => {
                if let Some(tree) = trees.first() {
                    if tree.n_features() != x.n_cols() {
                        return Err(ReliefError::fit(format!(
                            "forest fitted on {} features, got {}",
                            tree.n_features(),
                            x.n_cols()
                        )));
                    }
                }
                let n_trees = trees.len() as f64;
                Ok(x.rows()
                    .map(|row| trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / n_trees)
                    .collect())
            }
        }
    }

    /// Positive iff the mean probability exceeds one half.
    pub fn predict(&self, x: &SparseMatrix) -> Result<Vec<bool>> {
        Ok(self.predict_proba(x)?.into_iter().map(|p| p > 0.5).collect())
    }
}
