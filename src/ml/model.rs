//! The trained model artifact.
//!
//! A [`TrainedModel`] is everything needed to classify raw messages: the
//! analyzer configuration, the learned vocabulary and IDF weights, one
//! forest per category, the category names and [`ModelMetadata`] about the
//! run that produced it. The analyzer itself is rebuilt from its
//! configuration when a model is deserialized.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ReliefError, Result};
use crate::ml::forest::ForestParams;
use crate::ml::grid_search::{CandidateResult, SearchResults};
use crate::ml::metrics::Scoring;
use crate::ml::multi_output::{LabelMatrix, MultiOutputClassifier};
use crate::ml::persistence;
use crate::ml::pipeline::{FittedPipeline, PipelineSpec};
use crate::ml::vectorizer::Vocabulary;

/// Provenance of a trained model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Crate version that trained the model.
    pub version: String,
    pub n_train: usize,
    pub n_test: usize,
    pub vocabulary_size: usize,
    pub scoring: Scoring,
    pub best_cv_score: f64,
    pub cv_results: Vec<CandidateResult>,
}

impl ModelMetadata {
    pub fn from_search(
        search: &SearchResults,
        scoring: Scoring,
        n_train: usize,
        n_test: usize,
    ) -> Self {
        ModelMetadata {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            version: crate::VERSION.to_string(),
            n_train,
            n_test,
            vocabulary_size: search.best_pipeline.vectorizer().vocabulary_size(),
            scoring,
            best_cv_score: search.best_score,
            cv_results: search.candidates.clone(),
        }
    }
}

/// A fitted pipeline with its category names and metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "ModelSnapshot", into = "ModelSnapshot")]
pub struct TrainedModel {
    pipeline: FittedPipeline,
    category_names: Vec<String>,
    metadata: ModelMetadata,
}

impl TrainedModel {
    pub fn new(
        pipeline: FittedPipeline,
        category_names: Vec<String>,
        metadata: ModelMetadata,
    ) -> Result<Self> {
        let n_labels = pipeline.classifier().n_labels();
        if category_names.len() != n_labels {
            return Err(ReliefError::fit(format!(
                "{} category names for {n_labels} fitted label columns",
                category_names.len()
            )));
        }
        Ok(TrainedModel {
            pipeline,
            category_names,
            metadata,
        })
    }

    pub fn pipeline(&self) -> &FittedPipeline {
        &self.pipeline
    }

    pub fn category_names(&self) -> &[String] {
        &self.category_names
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Hyperparameters the forests were trained with.
    pub fn best_params(&self) -> &ForestParams {
        &self.pipeline.spec().forest
    }

    /// One row of category predictions per message.
    pub fn predict(&self, texts: &[String]) -> Result<LabelMatrix> {
        self.pipeline.predict(texts)
    }

    /// Names of the categories predicted for `text`.
    pub fn classify(&self, text: &str) -> Result<Vec<String>> {
        let predicted = self.predict(&[text.to_string()])?;
        Ok(self
            .category_names
            .iter()
            .zip(predicted.row(0))
            .filter(|(_, positive)| **positive)
            .map(|(name, _)| name.clone())
            .collect())
    }

    /// Write the model artifact to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save(self, path.as_ref())
    }

    /// Read and verify a model artifact.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load(path.as_ref())
    }
}

/// Serialized form of [`TrainedModel`].
#[derive(Serialize, Deserialize)]
struct ModelSnapshot {
    spec: PipelineSpec,
    vocabulary: Vocabulary,
    idf: Vec<f64>,
    classifier: MultiOutputClassifier,
    category_names: Vec<String>,
    metadata: ModelMetadata,
}

impl From<TrainedModel> for ModelSnapshot {
    fn from(model: TrainedModel) -> Self {
        let pipeline = model.pipeline;
        ModelSnapshot {
            spec: pipeline.spec().clone(),
            vocabulary: pipeline.vectorizer().vocabulary().cloned().unwrap_or_default(),
            idf: pipeline.tfidf().idf().map(<[f64]>::to_vec).unwrap_or_default(),
            classifier: pipeline.classifier().clone(),
            category_names: model.category_names,
            metadata: model.metadata,
        }
    }
}

impl TryFrom<ModelSnapshot> for TrainedModel {
    type Error = ReliefError;

    fn try_from(snapshot: ModelSnapshot) -> Result<Self> {
        let pipeline = FittedPipeline::from_parts(
            snapshot.spec,
            snapshot.vocabulary,
            snapshot.idf,
            snapshot.classifier,
        )?;
        TrainedModel::new(pipeline, snapshot.category_names, snapshot.metadata)
    }
}
