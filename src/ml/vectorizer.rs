//! Token count vectorizer.
//!
//! Turns messages into a document-term count matrix. The vocabulary is
//! learned once from the training messages; columns are assigned in sorted
//! token order so the same training messages always give the same columns,
//! whatever their order.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use ahash::AHashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::error::{ReliefError, Result};
use crate::ml::sparse::SparseMatrix;
use crate::ml::stage::Transformer;

/// Token → column index mapping, frozen after fit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: BTreeMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from distinct tokens; indices follow sorted order.
    pub fn from_terms(terms: BTreeSet<String>) -> Self {
        Vocabulary {
            terms: terms
                .into_iter()
                .enumerate()
                .map(|(index, term)| (term, index))
                .collect(),
        }
    }

    /// Column of `term`, if known.
    pub fn get(&self, term: &str) -> Option<usize> {
        self.terms.get(term).copied()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in column order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }
}

/// Counts vocabulary tokens per message.
#[derive(Clone)]
pub struct CountVectorizer {
    analyzer: Arc<dyn Analyzer>,
    vocabulary: Option<Vocabulary>,
}

impl std::fmt::Debug for CountVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountVectorizer")
            .field("analyzer", &self.analyzer.name())
            .field(
                "vocabulary_size",
                &self.vocabulary.as_ref().map(Vocabulary::len),
            )
            .finish()
    }
}

impl CountVectorizer {
    /// Create an unfitted vectorizer that tokenizes with `analyzer`.
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        CountVectorizer {
            analyzer,
            vocabulary: None,
        }
    }

    /// Rebuild a fitted vectorizer from a stored vocabulary.
    pub fn from_vocabulary(analyzer: Arc<dyn Analyzer>, vocabulary: Vocabulary) -> Self {
        CountVectorizer {
            analyzer,
            vocabulary: Some(vocabulary),
        }
    }

    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocabulary.as_ref()
    }

    /// Size of the vocabulary, zero before fit.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.as_ref().map_or(0, Vocabulary::len)
    }

    fn tokenize(&self, document: &str) -> Result<Vec<String>> {
        Ok(self.analyzer.analyze(document)?.map(|token| token.text).collect())
    }

    fn tokenize_all(&self, documents: &[String]) -> Result<Vec<Vec<String>>> {
        documents.iter().map(|doc| self.tokenize(doc)).collect()
    }

    fn learn_vocabulary(tokenized: &[Vec<String>]) -> Result<Vocabulary> {
        let terms: BTreeSet<String> = tokenized.iter().flatten().cloned().collect();
        if terms.is_empty() {
            return Err(ReliefError::fit(
                "empty vocabulary; the training messages contain no tokens",
            ));
        }
        Ok(Vocabulary::from_terms(terms))
    }

    fn count(vocabulary: &Vocabulary, tokenized: &[Vec<String>]) -> SparseMatrix {
        let mut matrix = SparseMatrix::new(vocabulary.len());
        let mut counts: AHashMap<usize, f64> = AHashMap::new();

        for tokens in tokenized {
            counts.clear();
            for token in tokens {
                if let Some(col) = vocabulary.get(token) {
                    *counts.entry(col).or_insert(0.0) += 1.0;
                }
            }
            let mut row: Vec<(usize, f64)> = counts.iter().map(|(&c, &v)| (c, v)).collect();
            row.sort_unstable_by_key(|&(col, _)| col);
            matrix.push_sorted_row(row);
        }

        matrix
    }
}

impl Transformer<[String]> for CountVectorizer {
    type Output = SparseMatrix;

    fn fit(&mut self, documents: &[String]) -> Result<()> {
        self.fit_transform(documents).map(|_| ())
    }

    fn transform(&self, documents: &[String]) -> Result<SparseMatrix> {
        let vocabulary = self
            .vocabulary
            .as_ref()
            .ok_or_else(|| ReliefError::not_fitted(self.name()))?;
        let tokenized = self.tokenize_all(documents)?;
        Ok(Self::count(vocabulary, &tokenized))
    }

    fn fit_transform(&mut self, documents: &[String]) -> Result<SparseMatrix> {
        let tokenized = self.tokenize_all(documents)?;
        let vocabulary = Self::learn_vocabulary(&tokenized)?;
        let matrix = Self::count(&vocabulary, &tokenized);
        debug!(
            "Learned vocabulary of {} terms from {} messages",
            vocabulary.len(),
            documents.len()
        );
        self.vocabulary = Some(vocabulary);
        Ok(matrix)
    }

    fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    fn name(&self) -> &'static str {
        "count"
    }
}
