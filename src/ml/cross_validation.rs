//! K-fold cross-validation splits.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{ReliefError, Result};

/// Row indices of one train/validation fold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// K-fold splitter.
///
/// Rows are divided into `n_splits` contiguous blocks (after an optional
/// seeded shuffle); the first `n % n_splits` blocks hold one extra row.
/// Each block is the validation set of exactly one fold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KFold {
    pub n_splits: usize,
    pub shuffle: bool,
    pub seed: u64,
}

impl Default for KFold {
    fn default() -> Self {
        KFold {
            n_splits: 5,
            shuffle: false,
            seed: 0,
        }
    }
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        KFold {
            n_splits,
            ..KFold::default()
        }
    }

    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_splits < 2 {
            return Err(ReliefError::config(format!(
                "cross-validation needs at least 2 folds, got {}",
                self.n_splits
            )));
        }
        Ok(())
    }

    /// Folds over `n_samples` rows.
    pub fn split(&self, n_samples: usize) -> Result<Vec<Fold>> {
        self.validate()?;
        if n_samples < self.n_splits {
            return Err(ReliefError::config(format!(
                "cannot make {} folds from {n_samples} rows",
                self.n_splits
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            let mut rng = StdRng::seed_from_u64(self.seed);
            indices.shuffle(&mut rng);
        }

        let base = n_samples / self.n_splits;
        let extra = n_samples % self.n_splits;
        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for k in 0..self.n_splits {
            let size = base + usize::from(k < extra);
            let end = start + size;
            let test = indices[start..end].to_vec();
            let train = indices[..start]
                .iter()
                .chain(&indices[end..])
                .copied()
                .collect();
            folds.push(Fold { train, test });
            start = end;
        }
        Ok(folds)
    }
}
