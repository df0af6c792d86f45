//! Compressed sparse row matrices.
//!
//! Document-term matrices are extremely sparse (a message has a dozen
//! distinct tokens out of tens of thousands), so every stage after the
//! tokenizer works on CSR rows of sorted `(column, value)` pairs.

use serde::{Deserialize, Serialize};

use crate::error::{ReliefError, Result};

/// A row-major sparse matrix of `f64` values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    n_cols: usize,
    /// Row `i` occupies `indices[indptr[i]..indptr[i + 1]]`.
    indptr: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<f64>,
}

/// A borrowed row of a [`SparseMatrix`].
#[derive(Clone, Copy, Debug)]
pub struct SparseRow<'a> {
    indices: &'a [usize],
    values: &'a [f64],
}

impl<'a> SparseRow<'a> {
    /// Column indices of the stored entries, ascending.
    pub fn indices(&self) -> &'a [usize] {
        self.indices
    }

    /// Values of the stored entries.
    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Value at `col`, zero if not stored.
    pub fn get(&self, col: usize) -> f64 {
        match self.indices.binary_search(&col) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    pub fn iter(self) -> impl Iterator<Item = (usize, f64)> + 'a {
        self.indices
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }
}

impl SparseMatrix {
    /// Create an empty matrix with `n_cols` columns and no rows.
    pub fn new(n_cols: usize) -> Self {
        SparseMatrix {
            n_cols,
            indptr: vec![0],
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build a matrix from per-row entry lists.
    ///
    /// Entries may be in any order; duplicates within a row are summed and
    /// explicit zeros dropped.
    pub fn from_rows(n_cols: usize, rows: Vec<Vec<(usize, f64)>>) -> Result<Self> {
        let mut matrix = SparseMatrix::new(n_cols);
        for (row_index, mut row) in rows.into_iter().enumerate() {
            if let Some(&(col, _)) = row.iter().find(|(col, _)| *col >= n_cols) {
                return Err(ReliefError::fit(format!(
                    "row {row_index}: column {col} out of bounds for {n_cols} columns"
                )));
            }
            row.sort_by_key(|&(col, _)| col);

            let mut merged: Vec<(usize, f64)> = Vec::with_capacity(row.len());
            for (col, value) in row {
                match merged.last_mut() {
                    Some((last, sum)) if *last == col => *sum += value,
                    _ => merged.push((col, value)),
                }
            }
            matrix.push_sorted_row(merged.into_iter().filter(|&(_, v)| v != 0.0));
        }
        Ok(matrix)
    }

    /// Append a row whose entries are already sorted by column and unique.
    pub(crate) fn push_sorted_row<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let row_start = self.indices.len();
        for (col, value) in entries {
            debug_assert!(col < self.n_cols);
            debug_assert!(self.indices.len() == row_start || self.indices[self.indices.len() - 1] < col);
            self.indices.push(col);
            self.values.push(value);
        }
        self.indptr.push(self.indices.len());
    }

    pub fn n_rows(&self) -> usize {
        self.indptr.len() - 1
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Total number of stored entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn row(&self, i: usize) -> SparseRow<'_> {
        let (start, end) = (self.indptr[i], self.indptr[i + 1]);
        SparseRow {
            indices: &self.indices[start..end],
            values: &self.values[start..end],
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = SparseRow<'_>> {
        (0..self.n_rows()).map(move |i| self.row(i))
    }

    /// Copy the given rows, in the given order, into a new matrix.
    pub fn select_rows(&self, rows: &[usize]) -> SparseMatrix {
        let mut selected = SparseMatrix::new(self.n_cols);
        for &i in rows {
            selected.push_sorted_row(self.row(i).iter());
        }
        selected
    }

    /// Build a matrix of the same width by mapping every row to new sorted entries.
    pub(crate) fn map_rows<F>(&self, mut f: F) -> SparseMatrix
    where
        F: FnMut(SparseRow<'_>) -> Vec<(usize, f64)>,
    {
        let mut mapped = SparseMatrix::new(self.n_cols);
        for row in self.rows() {
            mapped.push_sorted_row(f(row));
        }
        mapped
    }

    /// Dense copy, for inspection and tests.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        self.rows()
            .map(|row| {
                let mut dense = vec![0.0; self.n_cols];
                for (col, value) in row.iter() {
                    dense[col] = value;
                }
                dense
            })
            .collect()
    }
}
