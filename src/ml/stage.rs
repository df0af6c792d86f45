//! Pipeline stage traits.
//!
//! A text classification pipeline is a chain of [`Transformer`]s ending in an
//! [`Estimator`]. Every stage is fit exactly once, on the output of the stage
//! before it, and is read-only afterwards.

use crate::error::Result;
use crate::ml::multi_output::LabelMatrix;
use crate::ml::sparse::SparseMatrix;

/// A stage that learns parameters from its input and maps inputs to features.
pub trait Transformer<I: ?Sized>: Send + Sync {
    /// What `transform` produces.
    type Output;

    /// Learn the stage parameters from `input`.
    fn fit(&mut self, input: &I) -> Result<()>;

    /// Map `input` with the learned parameters.
    ///
    /// Calling this before [`fit`](Self::fit) is an error.
    fn transform(&self, input: &I) -> Result<Self::Output>;

    /// Fit on `input` and transform it.
    fn fit_transform(&mut self, input: &I) -> Result<Self::Output> {
        self.fit(input)?;
        self.transform(input)
    }

    /// Whether [`fit`](Self::fit) has completed.
    fn is_fitted(&self) -> bool;

    /// Stage name used in logs and `stage_names`.
    fn name(&self) -> &'static str;
}

/// The final stage: learns labels from features.
pub trait Estimator: Send + Sync {
    /// Learn from features `x` and labels `y` (same number of rows).
    fn fit(&mut self, x: &SparseMatrix, y: &LabelMatrix) -> Result<()>;

    /// Predict one row of labels per row of `x`.
    fn predict(&self, x: &SparseMatrix) -> Result<LabelMatrix>;

    fn is_fitted(&self) -> bool;

    fn name(&self) -> &'static str;
}
