//! Feature extraction, classification, model selection and persistence.
//!
//! The pieces compose into a [`pipeline::TextClassificationPipeline`]:
//!
//! ```text
//! messages → CountVectorizer → TfIdfTransformer → MultiOutputClassifier → labels
//! ```
//!
//! [`grid_search::GridSearch`] picks the forest parameters by k-fold
//! cross-validation, [`evaluation::Evaluator`] scores the chosen pipeline on
//! held-out data, and [`model::TrainedModel`] is what gets persisted.

pub mod cross_validation;
pub mod evaluation;
pub mod forest;
pub mod grid_search;
pub mod metrics;
pub mod model;
pub mod multi_output;
pub mod persistence;
pub mod pipeline;
pub mod sparse;
pub mod stage;
pub mod tfidf;
pub mod tree;
pub mod vectorizer;

pub use cross_validation::KFold;
pub use evaluation::{CategoryReport, EvaluationReport, Evaluator};
pub use forest::{ForestParams, MaxFeatures, RandomForestClassifier};
pub use grid_search::{CandidateResult, GridAxis, GridSearch, ParamGrid, SearchResults};
pub use metrics::Scoring;
pub use model::{ModelMetadata, TrainedModel};
pub use multi_output::{LabelMatrix, MultiOutputClassifier};
pub use pipeline::{FittedPipeline, PipelineSpec, TextClassificationPipeline};
pub use tfidf::{Norm, TfIdfConfig};
