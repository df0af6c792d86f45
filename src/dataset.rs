//! Labeled disaster messages.
//!
//! A [`Dataset`] is the in-memory form of the message table: one [`Example`]
//! per row, holding the message text and one boolean per category. The
//! category order is fixed by [`Dataset::category_names`] and is the order
//! used by every downstream stage.

pub mod loader;
pub mod split;

pub use loader::{LoaderConfig, SqliteLoader};

use serde::{Deserialize, Serialize};

use crate::error::{ReliefError, Result};
use crate::ml::multi_output::LabelMatrix;

/// A single labeled message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// Raw message text.
    pub text: String,
    /// One flag per category, in `category_names` order.
    pub labels: Vec<bool>,
}

impl Example {
    pub fn new<S: Into<String>>(text: S, labels: Vec<bool>) -> Self {
        Example {
            text: text.into(),
            labels,
        }
    }
}

/// Messages with their category labels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    category_names: Vec<String>,
    examples: Vec<Example>,
}

impl Dataset {
    /// Create a dataset, checking that every example has one label per category.
    pub fn new(category_names: Vec<String>, examples: Vec<Example>) -> Result<Self> {
        if category_names.is_empty() {
            return Err(ReliefError::data_source("no category columns"));
        }
        if let Some((row, example)) = examples
            .iter()
            .enumerate()
            .find(|(_, e)| e.labels.len() != category_names.len())
        {
            return Err(ReliefError::invalid_input(format!(
                "row {row} has {} labels, expected {}",
                example.labels.len(),
                category_names.len()
            )));
        }

        Ok(Dataset {
            category_names,
            examples,
        })
    }

    pub fn category_names(&self) -> &[String] {
        &self.category_names
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn n_categories(&self) -> usize {
        self.category_names.len()
    }

    /// Message texts in row order.
    pub fn texts(&self) -> Vec<String> {
        self.examples.iter().map(|e| e.text.clone()).collect()
    }

    /// Labels as a dense row-major matrix.
    pub fn label_matrix(&self) -> LabelMatrix {
        let data = self
            .examples
            .iter()
            .flat_map(|e| e.labels.iter().copied())
            .collect();
        LabelMatrix::from_parts(self.examples.len(), self.category_names.len(), data)
    }

    /// Number of positive examples per category.
    pub fn positive_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.category_names.len()];
        for example in &self.examples {
            for (count, &label) in counts.iter_mut().zip(&example.labels) {
                *count += usize::from(label);
            }
        }
        counts
    }

    /// A dataset with the same categories and the given rows, in the given order.
    pub(crate) fn subset(&self, rows: &[usize]) -> Dataset {
        Dataset {
            category_names: self.category_names.clone(),
            examples: rows.iter().map(|&i| self.examples[i].clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["water".to_string(), "food".to_string()]
    }

    #[test]
    fn test_dataset_validates_label_width() {
        let result = Dataset::new(
            names(),
            vec![
                Example::new("need water", vec![true, false]),
                Example::new("need food", vec![true]),
            ],
        );

        match result {
            Err(ReliefError::InvalidInput(msg)) => assert!(msg.contains("row 1")),
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[test]
    fn test_dataset_requires_categories() {
        assert!(matches!(
            Dataset::new(Vec::new(), Vec::new()),
            Err(ReliefError::DataSource(_))
        ));
    }

    #[test]
    fn test_label_matrix_and_counts() {
        let dataset = Dataset::new(
            names(),
            vec![
                Example::new("need water", vec![true, false]),
                Example::new("need food and water", vec![true, true]),
                Example::new("all fine", vec![false, false]),
            ],
        )
        .unwrap();

        let labels = dataset.label_matrix();
        assert_eq!(labels.n_rows(), 3);
        assert_eq!(labels.n_labels(), 2);
        assert_eq!(labels.column(1), vec![false, true, false]);
        assert_eq!(dataset.positive_counts(), vec![2, 1]);
        assert_eq!(dataset.texts()[2], "all fine");
    }
}
