//! Per-category evaluation reports.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReliefError, Result};
use crate::ml::metrics::{self, BinaryConfusion, ClassMetrics};
use crate::ml::multi_output::LabelMatrix;

/// Metrics for one category, both classes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub name: String,
    pub positive: ClassMetrics,
    pub negative: ClassMetrics,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl CategoryReport {
    pub fn from_confusion(name: impl Into<String>, confusion: &BinaryConfusion) -> Self {
        let positive = confusion.positive();
        let negative = confusion.negative();
        CategoryReport {
            name: name.into(),
            accuracy: confusion.accuracy(),
            macro_avg: ClassMetrics::macro_average(&negative, &positive),
            weighted_avg: ClassMetrics::weighted_average(&negative, &positive),
            positive,
            negative,
        }
    }

    /// Number of positive rows in the evaluated split.
    pub fn support(&self) -> usize {
        self.positive.support
    }
}

const LABEL_WIDTH: usize = 12;

fn write_class_row(f: &mut fmt::Formatter<'_>, label: &str, m: &ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{label:>LABEL_WIDTH$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
        m.precision, m.recall, m.f1, m.support
    )
}

impl fmt::Display for CategoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Column : {}", self.name)?;
        writeln!(
            f,
            "{:>LABEL_WIDTH$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        write_class_row(f, "0", &self.negative)?;
        write_class_row(f, "1", &self.positive)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>LABEL_WIDTH$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_class_row(f, "macro avg", &self.macro_avg)?;
        write_class_row(f, "weighted avg", &self.weighted_avg)
    }
}

/// Held-out evaluation of every category plus multi-label summary scores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub categories: Vec<CategoryReport>,
    pub subset_accuracy: f64,
    pub hamming_accuracy: f64,
    pub macro_f1: f64,
    pub micro_f1: f64,
}

impl EvaluationReport {
    pub fn category(&self, name: &str) -> Option<&CategoryReport> {
        self.categories.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for category in &self.categories {
            writeln!(f, "{category}")?;
        }
        writeln!(f, "Subset accuracy:  {:.4}", self.subset_accuracy)?;
        writeln!(f, "Hamming accuracy: {:.4}", self.hamming_accuracy)?;
        writeln!(f, "Macro F1:         {:.4}", self.macro_f1)?;
        write!(f, "Micro F1:         {:.4}", self.micro_f1)
    }
}

/// Scores predictions against ground truth, one report per category.
#[derive(Clone, Debug)]
pub struct Evaluator {
    category_names: Vec<String>,
}

impl Evaluator {
    pub fn new(category_names: Vec<String>) -> Self {
        Evaluator { category_names }
    }

    pub fn evaluate(&self, truth: &LabelMatrix, predicted: &LabelMatrix) -> Result<EvaluationReport> {
        if truth.n_labels() != self.category_names.len() {
            return Err(ReliefError::fit(format!(
                "{} categories but {} label columns",
                self.category_names.len(),
                truth.n_labels()
            )));
        }
        if predicted.n_rows() != truth.n_rows() || predicted.n_labels() != truth.n_labels() {
            return Err(ReliefError::fit("predictions and labels differ in shape"));
        }

        let mut categories = Vec::with_capacity(self.category_names.len());
        for (j, name) in self.category_names.iter().enumerate() {
            let confusion = BinaryConfusion::from_columns(&truth.column(j), &predicted.column(j))?;
            categories.push(CategoryReport::from_confusion(name.clone(), &confusion));
        }

        Ok(EvaluationReport {
            categories,
            subset_accuracy: metrics::subset_accuracy(truth, predicted)?,
            hamming_accuracy: metrics::hamming_accuracy(truth, predicted)?,
            macro_f1: metrics::macro_f1(truth, predicted)?,
            micro_f1: metrics::micro_f1(truth, predicted)?,
        })
    }
}
