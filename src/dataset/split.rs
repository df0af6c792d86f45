//! Random train/test split.

use log::{debug, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::dataset::Dataset;
use crate::error::{ReliefError, Result};

/// Default share of rows held out for evaluation.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Number of held-out rows for `n` examples: `ceil(n * test_fraction)`,
/// clamped so that both sides are non-empty.
pub fn test_size(n: usize, test_fraction: f64) -> Result<usize> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ReliefError::config(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }
    if n < 2 {
        return Err(ReliefError::config(format!(
            "cannot split {n} example(s) into train and test sets"
        )));
    }

    let n_test = (n as f64 * test_fraction).ceil() as usize;
    Ok(n_test.clamp(1, n - 1))
}

impl Dataset {
    /// Shuffle the rows with `seed` and hold out `test_fraction` of them.
    ///
    /// The split is not stratified: a rare category can end up with no
    /// positive rows in the test set. Such categories are logged.
    pub fn train_test_split(&self, test_fraction: f64, seed: u64) -> Result<(Dataset, Dataset)> {
        let n_test = test_size(self.len(), test_fraction)?;

        let mut rows: Vec<usize> = (0..self.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        rows.shuffle(&mut rng);

        let (test_rows, train_rows) = rows.split_at(n_test);
        let train = self.subset(train_rows);
        let test = self.subset(test_rows);

        debug!(
            "Split {} examples into {} train / {} test (seed {seed})",
            self.len(),
            train.len(),
            test.len()
        );

        for (name, count) in self.category_names().iter().zip(test.positive_counts()) {
            if count == 0 {
                warn!("Category `{name}` has no positive examples in the test split");
            }
        }

        Ok((train, test))
    }
}
