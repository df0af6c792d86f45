//! Classification metrics over boolean label columns.
//!
//! Every ratio with a zero denominator is reported as `0.0`.

use serde::{Deserialize, Serialize};

use crate::error::{ReliefError, Result};
use crate::ml::multi_output::LabelMatrix;

/// Confusion counts for one boolean column, positive class = `true`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryConfusion {
    pub tp: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tn: usize,
}

impl BinaryConfusion {
    pub fn from_columns(truth: &[bool], predicted: &[bool]) -> Result<Self> {
        if truth.len() != predicted.len() {
            return Err(ReliefError::fit(format!(
                "{} true values but {} predictions",
                truth.len(),
                predicted.len()
            )));
        }
        let mut confusion = BinaryConfusion::default();
        for (&t, &p) in truth.iter().zip(predicted) {
            match (t, p) {
                (true, true) => confusion.tp += 1,
                (false, true) => confusion.fp += 1,
                (true, false) => confusion.fn_ += 1,
                (false, false) => confusion.tn += 1,
            }
        }
        Ok(confusion)
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.fn_ + self.tn
    }

    /// Fraction of correct predictions.
    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    /// Metrics for the `true` class.
    pub fn positive(&self) -> ClassMetrics {
        ClassMetrics::from_counts(self.tp, self.fp, self.fn_)
    }

    /// Metrics for the `false` class.
    pub fn negative(&self) -> ClassMetrics {
        ClassMetrics::from_counts(self.tn, self.fn_, self.fp)
    }
}

impl std::ops::AddAssign for BinaryConfusion {
    fn add_assign(&mut self, other: Self) {
        self.tp += other.tp;
        self.fp += other.fp;
        self.fn_ += other.fn_;
        self.tn += other.tn;
    }
}

/// Precision, recall, F1 and support of one class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl ClassMetrics {
    /// From true positives, false positives and false negatives of the class.
    pub fn from_counts(tp: usize, fp: usize, fn_: usize) -> Self {
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        ClassMetrics {
            precision,
            recall,
            f1,
            support: tp + fn_,
        }
    }

    /// Unweighted mean of the two classes; support is their sum.
    pub fn macro_average(a: &ClassMetrics, b: &ClassMetrics) -> Self {
        ClassMetrics {
            precision: (a.precision + b.precision) / 2.0,
            recall: (a.recall + b.recall) / 2.0,
            f1: (a.f1 + b.f1) / 2.0,
            support: a.support + b.support,
        }
    }

    /// Support-weighted mean of the two classes.
    pub fn weighted_average(a: &ClassMetrics, b: &ClassMetrics) -> Self {
        let total = a.support + b.support;
        if total == 0 {
            return ClassMetrics::default();
        }
        let (wa, wb) = (a.support as f64, b.support as f64);
        let mean = |x: f64, y: f64| (x * wa + y * wb) / total as f64;
        ClassMetrics {
            precision: mean(a.precision, b.precision),
            recall: mean(a.recall, b.recall),
            f1: mean(a.f1, b.f1),
            support: total,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn check_shapes(truth: &LabelMatrix, predicted: &LabelMatrix) -> Result<()> {
    if truth.n_rows() != predicted.n_rows() || truth.n_labels() != predicted.n_labels() {
        return Err(ReliefError::fit(format!(
            "cannot score {}x{} predictions against {}x{} labels",
            predicted.n_rows(),
            predicted.n_labels(),
            truth.n_rows(),
            truth.n_labels()
        )));
    }
    Ok(())
}

fn confusions(truth: &LabelMatrix, predicted: &LabelMatrix) -> Result<Vec<BinaryConfusion>> {
    check_shapes(truth, predicted)?;
    (0..truth.n_labels())
        .map(|j| BinaryConfusion::from_columns(&truth.column(j), &predicted.column(j)))
        .collect()
}

/// Fraction of rows whose every label is predicted correctly.
pub fn subset_accuracy(truth: &LabelMatrix, predicted: &LabelMatrix) -> Result<f64> {
    check_shapes(truth, predicted)?;
    let exact = truth
        .rows()
        .zip(predicted.rows())
        .filter(|(t, p)| t == p)
        .count();
    Ok(ratio(exact, truth.n_rows()))
}

/// Fraction of individual labels predicted correctly.
pub fn hamming_accuracy(truth: &LabelMatrix, predicted: &LabelMatrix) -> Result<f64> {
    let total = confusions(truth, predicted)?
        .into_iter()
        .fold(BinaryConfusion::default(), |mut acc, c| {
            acc += c;
            acc
        });
    Ok(total.accuracy())
}

/// Mean positive-class F1 over label columns.
pub fn macro_f1(truth: &LabelMatrix, predicted: &LabelMatrix) -> Result<f64> {
    let per_label = confusions(truth, predicted)?;
    if per_label.is_empty() {
        return Ok(0.0);
    }
    let sum: f64 = per_label.iter().map(|c| c.positive().f1).sum();
    Ok(sum / per_label.len() as f64)
}

/// Positive-class F1 over the pooled counts of every label column.
pub fn micro_f1(truth: &LabelMatrix, predicted: &LabelMatrix) -> Result<f64> {
    let mut pooled = BinaryConfusion::default();
    for c in confusions(truth, predicted)? {
        pooled += c;
    }
    Ok(pooled.positive().f1)
}

/// Score used to rank grid search candidates. Higher is better.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    /// Every label of a row must match.
    #[default]
    SubsetAccuracy,
    HammingAccuracy,
    MacroF1,
    MicroF1,
}

impl Scoring {
    pub fn score(&self, truth: &LabelMatrix, predicted: &LabelMatrix) -> Result<f64> {
        match self {
            Scoring::SubsetAccuracy => subset_accuracy(truth, predicted),
            Scoring::HammingAccuracy => hamming_accuracy(truth, predicted),
            Scoring::MacroF1 => macro_f1(truth, predicted),
            Scoring::MicroF1 => micro_f1(truth, predicted),
        }
    }
}

impl std::fmt::Display for Scoring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Scoring::SubsetAccuracy => "subset_accuracy",
            Scoring::HammingAccuracy => "hamming_accuracy",
            Scoring::MacroF1 => "macro_f1",
            Scoring::MicroF1 => "micro_f1",
        };
        f.write_str(name)
    }
}
