//! TF-IDF weighting of count matrices.
//!
//! Inverse document frequencies are learned from the training count matrix
//! only and reused unchanged for every later transform:
//!
//! ```text
//! idf(t) = ln((1 + n) / (1 + df(t))) + 1     (smooth_idf = true)
//! idf(t) = ln(n / df(t)) + 1                 (smooth_idf = false)
//! ```
//!
//! Each weighted row is then normalized (L2 by default).

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ReliefError, Result};
use crate::ml::sparse::SparseMatrix;
use crate::ml::stage::Transformer;

/// Row normalization applied after weighting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Norm {
    /// Unit Euclidean length.
    #[default]
    L2,
    /// Unit sum of absolute values.
    L1,
    /// No normalization.
    None,
}

/// TF-IDF options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfIdfConfig {
    pub norm: Norm,
    /// Add one to document frequencies, as if an extra document contained every term.
    pub smooth_idf: bool,
    /// Replace term frequency `tf` with `1 + ln(tf)`.
    pub sublinear_tf: bool,
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        TfIdfConfig {
            norm: Norm::L2,
            smooth_idf: true,
            sublinear_tf: false,
        }
    }
}

/// Reweights a count matrix by inverse document frequency.
#[derive(Clone, Debug, Default)]
pub struct TfIdfTransformer {
    config: TfIdfConfig,
    idf: Option<Vec<f64>>,
}

impl TfIdfTransformer {
    pub fn new(config: TfIdfConfig) -> Self {
        TfIdfTransformer { config, idf: None }
    }

    /// Rebuild a fitted transformer from stored IDF weights.
    pub fn from_idf(config: TfIdfConfig, idf: Vec<f64>) -> Self {
        TfIdfTransformer {
            config,
            idf: Some(idf),
        }
    }

    pub fn config(&self) -> &TfIdfConfig {
        &self.config
    }

    /// Learned IDF weights, one per column.
    pub fn idf(&self) -> Option<&[f64]> {
        self.idf.as_deref()
    }

    fn normalize(&self, row: &mut [(usize, f64)]) {
        let norm = match self.config.norm {
            Norm::L2 => row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Norm::L1 => row.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            Norm::None => return,
        };
        if norm > 0.0 {
            for (_, value) in row.iter_mut() {
                *value /= norm;
            }
        }
    }
}

impl Transformer<SparseMatrix> for TfIdfTransformer {
    type Output = SparseMatrix;

    fn fit(&mut self, counts: &SparseMatrix) -> Result<()> {
        let n_docs = counts.n_rows() as f64;
        let mut df = vec![0usize; counts.n_cols()];
        for row in counts.rows() {
            for (col, value) in row.iter() {
                if value != 0.0 {
                    df[col] += 1;
                }
            }
        }

        let idf = df
            .iter()
            .map(|&df| {
                let df = df as f64;
                if self.config.smooth_idf {
                    ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
                } else {
                    (n_docs / df.max(1.0)).ln() + 1.0
                }
            })
            .collect::<Vec<_>>();

        debug!(
            "Fitted IDF weights for {} terms over {} documents",
            idf.len(),
            counts.n_rows()
        );
        self.idf = Some(idf);
        Ok(())
    }

    fn transform(&self, counts: &SparseMatrix) -> Result<SparseMatrix> {
        let idf = self
            .idf
            .as_ref()
            .ok_or_else(|| ReliefError::not_fitted(self.name()))?;
        if counts.n_cols() != idf.len() {
            return Err(ReliefError::fit(format!(
                "tfidf fitted on {} columns, got {}",
                idf.len(),
                counts.n_cols()
            )));
        }

        Ok(counts.map_rows(|row| {
            let mut weighted: Vec<(usize, f64)> = row
                .iter()
                .map(|(col, tf)| {
                    let tf = if self.config.sublinear_tf && tf > 0.0 {
                        1.0 + tf.ln()
                    } else {
                        tf
                    };
                    (col, tf * idf[col])
                })
                .collect();
            self.normalize(&mut weighted);
            weighted
        }))
    }

    fn is_fitted(&self) -> bool {
        self.idf.is_some()
    }

    fn name(&self) -> &'static str {
        "tfidf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts() -> SparseMatrix {
        // 3 documents, 3 terms: term 0 in every document, term 2 in one.
        SparseMatrix::from_rows(
            3,
            vec![
                vec![(0, 1.0), (1, 2.0)],
                vec![(0, 1.0), (1, 1.0)],
                vec![(0, 3.0), (2, 1.0)],
            ],
        )
        .unwrap()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn test_smooth_idf() {
        let mut tfidf = TfIdfTransformer::default();
        tfidf.fit(&counts()).unwrap();

        let idf = tfidf.idf().unwrap();
        assert_close(idf[0], 1.0);
        assert_close(idf[1], (4.0f64 / 3.0).ln() + 1.0);
        assert_close(idf[2], 2.0f64.ln() + 1.0);
    }

    #[test]
    fn test_unsmoothed_idf() {
        let mut tfidf = TfIdfTransformer::new(TfIdfConfig {
            smooth_idf: false,
            ..TfIdfConfig::default()
        });
        tfidf.fit(&counts()).unwrap();

        let idf = tfidf.idf().unwrap();
        assert_close(idf[0], 1.0);
        assert_close(idf[2], 3.0f64.ln() + 1.0);
    }

    #[test]
    fn test_rows_are_l2_normalized() {
        let mut tfidf = TfIdfTransformer::default();
        let weighted = tfidf.fit_transform(&counts()).unwrap();

        for row in weighted.rows() {
            let norm: f64 = row.values().iter().map(|v| v * v).sum::<f64>().sqrt();
            assert_close(norm, 1.0);
        }
    }

    #[test]
    fn test_l1_and_no_norm() {
        let mut l1 = TfIdfTransformer::new(TfIdfConfig {
            norm: Norm::L1,
            ..TfIdfConfig::default()
        });
        let weighted = l1.fit_transform(&counts()).unwrap();
        assert_close(weighted.row(0).values().iter().sum::<f64>(), 1.0);

        let mut raw = TfIdfTransformer::new(TfIdfConfig {
            norm: Norm::None,
            ..TfIdfConfig::default()
        });
        let weighted = raw.fit_transform(&counts()).unwrap();
        assert_close(weighted.row(2).get(0), 3.0);
    }

    #[test]
    fn test_sublinear_tf() {
        let mut tfidf = TfIdfTransformer::new(TfIdfConfig {
            norm: Norm::None,
            sublinear_tf: true,
            ..TfIdfConfig::default()
        });
        let weighted = tfidf.fit_transform(&counts()).unwrap();
        assert_close(weighted.row(2).get(0), 1.0 + 3.0f64.ln());
    }

    #[test]
    fn test_idf_depends_only_on_fit_data() {
        let mut tfidf = TfIdfTransformer::default();
        tfidf.fit(&counts()).unwrap();
        let before = tfidf.idf().unwrap().to_vec();

        let other = SparseMatrix::from_rows(3, vec![vec![(2, 5.0)]]).unwrap();
        tfidf.transform(&other).unwrap();
        assert_eq!(tfidf.idf().unwrap(), before.as_slice());
    }

    #[test]
    fn test_width_mismatch_and_unfitted() {
        let tfidf = TfIdfTransformer::default();
        assert!(matches!(
            tfidf.transform(&counts()),
            Err(ReliefError::Fit(_))
        ));

        let mut tfidf = TfIdfTransformer::default();
        tfidf.fit(&counts()).unwrap();
        let wide = SparseMatrix::new(4);
        assert!(matches!(tfidf.transform(&wide), Err(ReliefError::Fit(_))));
    }

    #[test]
    fn test_empty_row_stays_empty() {
        let mut tfidf = TfIdfTransformer::default();
        tfidf.fit(&counts()).unwrap();
        let empty = SparseMatrix::from_rows(3, vec![vec![]]).unwrap();
        assert_eq!(tfidf.transform(&empty).unwrap().row(0).nnz(), 0);
    }
}
