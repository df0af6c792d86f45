//! Count → TF-IDF → multi-output forest pipeline.
//!
//! [`TextClassificationPipeline`] holds the three unfitted stages. Fitting
//! consumes it and yields a [`FittedPipeline`]; each stage is fit once, on
//! the output of the stage before it.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{AnalyzerConfig, MessageAnalyzer};
use crate::error::{ReliefError, Result};
use crate::ml::forest::ForestParams;
use crate::ml::multi_output::{LabelMatrix, MultiOutputClassifier};
use crate::ml::sparse::SparseMatrix;
use crate::ml::stage::{Estimator, Transformer};
use crate::ml::tfidf::{TfIdfConfig, TfIdfTransformer};
use crate::ml::vectorizer::{CountVectorizer, Vocabulary};

/// Everything needed to build a fresh pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSpec {
    pub analyzer: AnalyzerConfig,
    pub tfidf: TfIdfConfig,
    pub forest: ForestParams,
}

impl PipelineSpec {
    /// A copy of this pipeline description with different forest parameters.
    pub fn with_forest(&self, forest: ForestParams) -> Self {
        PipelineSpec {
            forest,
            ..self.clone()
        }
    }
}

/// An unfitted pipeline.
#[derive(Debug)]
pub struct TextClassificationPipeline {
    spec: PipelineSpec,
    count: CountVectorizer,
    tfidf: TfIdfTransformer,
    model: MultiOutputClassifier,
}

impl TextClassificationPipeline {
    pub fn new(spec: PipelineSpec) -> Result<Self> {
        let analyzer = Arc::new(MessageAnalyzer::new(spec.analyzer.clone())?);
        Ok(TextClassificationPipeline {
            count: CountVectorizer::new(analyzer),
            tfidf: TfIdfTransformer::new(spec.tfidf),
            model: MultiOutputClassifier::new(spec.forest),
            spec,
        })
    }

    pub fn with_category_names(mut self, names: Vec<String>) -> Self {
        self.model = self.model.with_category_names(names);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.model = self.model.with_parallel(parallel);
        self
    }

    /// Log constant label columns at `debug` only.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.model = self.model.with_quiet(quiet);
        self
    }

    pub fn spec(&self) -> &PipelineSpec {
        &self.spec
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        vec![self.count.name(), self.tfidf.name(), self.model.name()]
    }

    /// Fit every stage on `texts` and `labels`.
    pub fn fit(mut self, texts: &[String], labels: &LabelMatrix) -> Result<FittedPipeline> {
        if texts.len() != labels.n_rows() {
            return Err(ReliefError::fit(format!(
                "{} messages but {} label rows",
                texts.len(),
                labels.n_rows()
            )));
        }

        let counts = self.count.fit_transform(texts)?;
        let features = self.tfidf.fit_transform(&counts)?;
        self.model.fit(&features, labels)?;
        debug!(
            "Fitted pipeline on {} messages ({} terms, {} labels)",
            texts.len(),
            self.count.vocabulary_size(),
            labels.n_labels()
        );

        Ok(FittedPipeline {
            spec: self.spec,
            count: self.count,
            tfidf: self.tfidf,
            model: self.model,
        })
    }
}

/// A pipeline whose stages are all fitted. Read-only.
#[derive(Clone, Debug)]
pub struct FittedPipeline {
    spec: PipelineSpec,
    count: CountVectorizer,
    tfidf: TfIdfTransformer,
    model: MultiOutputClassifier,
}

impl FittedPipeline {
    /// Reassemble a fitted pipeline from its learned parts.
    pub fn from_parts(
        spec: PipelineSpec,
        vocabulary: Vocabulary,
        idf: Vec<f64>,
        model: MultiOutputClassifier,
    ) -> Result<Self> {
        if vocabulary.len() != idf.len() {
            return Err(ReliefError::fit(format!(
                "vocabulary has {} terms but {} idf weights",
                vocabulary.len(),
                idf.len()
            )));
        }
        if !model.is_fitted() {
            return Err(ReliefError::not_fitted(model.name()));
        }
        let analyzer = Arc::new(MessageAnalyzer::new(spec.analyzer.clone())?);
        Ok(FittedPipeline {
            count: CountVectorizer::from_vocabulary(analyzer, vocabulary),
            tfidf: TfIdfTransformer::from_idf(spec.tfidf, idf),
            model,
            spec,
        })
    }

    pub fn spec(&self) -> &PipelineSpec {
        &self.spec
    }

    pub fn vectorizer(&self) -> &CountVectorizer {
        &self.count
    }

    pub fn tfidf(&self) -> &TfIdfTransformer {
        &self.tfidf
    }

    pub fn classifier(&self) -> &MultiOutputClassifier {
        &self.model
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        vec![self.count.name(), self.tfidf.name(), self.model.name()]
    }

    /// TF-IDF features for `texts`.
    pub fn transform(&self, texts: &[String]) -> Result<SparseMatrix> {
        let counts = self.count.transform(texts)?;
        self.tfidf.transform(&counts)
    }

    pub fn predict(&self, texts: &[String]) -> Result<LabelMatrix> {
        let features = self.transform(texts)?;
        self.model.predict(&features)
    }
}
