//! One forest per category.
//!
//! [`MultiOutputClassifier`] fits an independent [`RandomForestClassifier`]
//! for every column of a [`LabelMatrix`]. Columns never share state, so the
//! fitted forest for column `i` depends only on the features and column `i`.

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ReliefError, Result};
use crate::ml::forest::{ForestParams, RandomForestClassifier};
use crate::ml::sparse::SparseMatrix;
use crate::ml::stage::Estimator;

/// Dense row-major boolean label matrix.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMatrix {
    n_rows: usize,
    n_labels: usize,
    data: Vec<bool>,
}

impl LabelMatrix {
    /// Wrap row-major `data` of shape `n_rows × n_labels`.
    pub(crate) fn from_parts(n_rows: usize, n_labels: usize, data: Vec<bool>) -> Self {
        debug_assert_eq!(data.len(), n_rows * n_labels);
        LabelMatrix {
            n_rows,
            n_labels,
            data,
        }
    }

    /// Build a matrix from rows of equal width.
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Result<Self> {
        let n_labels = rows.first().map_or(0, Vec::len);
        let n_rows = rows.len();
        let mut data = Vec::with_capacity(n_rows * n_labels);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_labels {
                return Err(ReliefError::invalid_input(format!(
                    "label row {i} has {} values, expected {n_labels}",
                    row.len()
                )));
            }
            data.extend(row);
        }
        Ok(LabelMatrix::from_parts(n_rows, n_labels, data))
    }

    /// Build a matrix from `n_rows`-long columns.
    pub fn from_columns(n_rows: usize, columns: &[Vec<bool>]) -> Result<Self> {
        if let Some((j, column)) = columns.iter().enumerate().find(|(_, c)| c.len() != n_rows) {
            return Err(ReliefError::fit(format!(
                "label column {j} has {} rows, expected {n_rows}",
                column.len()
            )));
        }
        let n_labels = columns.len();
        let mut data = Vec::with_capacity(n_rows * n_labels);
        for i in 0..n_rows {
            data.extend(columns.iter().map(|column| column[i]));
        }
        Ok(LabelMatrix::from_parts(n_rows, n_labels, data))
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_labels(&self) -> usize {
        self.n_labels
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn get(&self, row: usize, label: usize) -> bool {
        self.data[row * self.n_labels + label]
    }

    pub fn row(&self, row: usize) -> &[bool] {
        let start = row * self.n_labels;
        &self.data[start..start + self.n_labels]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        (0..self.n_rows).map(move |i| self.row(i))
    }

    /// Copy of column `label`.
    pub fn column(&self, label: usize) -> Vec<bool> {
        (0..self.n_rows).map(|i| self.get(i, label)).collect()
    }

    /// A new matrix with the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> LabelMatrix {
        let data = rows.iter().flat_map(|&i| self.row(i).iter().copied()).collect();
        LabelMatrix::from_parts(rows.len(), self.n_labels, data)
    }
}

/// Fits one random forest per label column.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultiOutputClassifier {
    params: ForestParams,
    category_names: Vec<String>,
    parallel: bool,
    #[serde(skip)]
    quiet: bool,
    forests: Option<Vec<RandomForestClassifier>>,
}

impl MultiOutputClassifier {
    pub fn new(params: ForestParams) -> Self {
        MultiOutputClassifier {
            params,
            category_names: Vec::new(),
            parallel: false,
            quiet: false,
            forests: None,
        }
    }

    /// Name the label columns; used in log messages.
    pub fn with_category_names(mut self, names: Vec<String>) -> Self {
        self.category_names = names;
        self
    }

    /// Fit and predict the label columns on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Report constant columns at `debug` instead of `warn`.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn category_names(&self) -> &[String] {
        &self.category_names
    }

    /// Fitted forests in label order.
    pub fn forests(&self) -> Option<&[RandomForestClassifier]> {
        self.forests.as_deref()
    }

    /// Number of label columns seen at fit time.
    pub fn n_labels(&self) -> usize {
        self.forests.as_ref().map_or(0, Vec::len)
    }

    /// Names of the columns fitted as constant predictors.
    pub fn degenerate_columns(&self) -> Vec<String> {
        self.forests
            .iter()
            .flatten()
            .enumerate()
            .filter(|(_, forest)| forest.is_constant())
            .map(|(j, _)| self.column_name(j))
            .collect()
    }

    fn column_name(&self, j: usize) -> String {
        self.category_names
            .get(j)
            .cloned()
            .unwrap_or_else(|| format!("label_{j}"))
    }

    fn fit_column(&self, x: &SparseMatrix, y: &LabelMatrix, j: usize) -> Result<RandomForestClassifier> {
        let mut forest = RandomForestClassifier::new(self.params);
        forest.fit(x, &y.column(j))?;
        debug!("Fitted forest for `{}`", self.column_name(j));
        Ok(forest)
    }

    /// Mean positive probability per row, one vector per label column.
    pub fn predict_proba(&self, x: &SparseMatrix) -> Result<Vec<Vec<f64>>> {
        let forests = self
            .forests
            .as_ref()
            .ok_or_else(|| ReliefError::not_fitted(self.name()))?;
        if self.parallel {
            forests.par_iter().map(|f| f.predict_proba(x)).collect()
        } else {
            forests.iter().map(|f| f.predict_proba(x)).collect()
        }
    }
}

impl Estimator for MultiOutputClassifier {
    fn fit(&mut self, x: &SparseMatrix, y: &LabelMatrix) -> Result<()> {
        if x.n_rows() != y.n_rows() {
            return Err(ReliefError::fit(format!(
                "features have {} rows but labels have {}",
                x.n_rows(),
                y.n_rows()
            )));
        }
        if y.n_labels() == 0 {
            return Err(ReliefError::fit("label matrix has no columns"));
        }
        if !self.category_names.is_empty() && self.category_names.len() != y.n_labels() {
            return Err(ReliefError::fit(format!(
                "{} category names for {} label columns",
                self.category_names.len(),
                y.n_labels()
            )));
        }
        self.params.validate()?;

        let forests = if self.parallel {
            (0..y.n_labels())
                .into_par_iter()
                .map(|j| self.fit_column(x, y, j))
                .collect::<Result<Vec<_>>>()?
        } else {
            (0..y.n_labels())
                .map(|j| self.fit_column(x, y, j))
                .collect::<Result<Vec<_>>>()?
        };
        self.forests = Some(forests);

        for column in self.degenerate_columns() {
            let condition = ReliefError::degenerate_column(column);
            if self.quiet {
                debug!("{condition}");
            } else {
                warn!("{condition}");
            }
        }
        Ok(())
    }

    fn predict(&self, x: &SparseMatrix) -> Result<LabelMatrix> {
        let forests = self
            .forests
            .as_ref()
            .ok_or_else(|| ReliefError::not_fitted(self.name()))?;
        let columns = if self.parallel {
            forests
                .par_iter()
                .map(|f| f.predict(x))
                .collect::<Result<Vec<_>>>()?
        } else {
            forests
                .iter()
                .map(|f| f.predict(x))
                .collect::<Result<Vec<_>>>()?
        };
        LabelMatrix::from_columns(x.n_rows(), &columns)
    }

    fn is_fitted(&self) -> bool {
        self.forests.is_some()
    }

    fn name(&self) -> &'static str {
        "multi_output_forest"
    }
}
