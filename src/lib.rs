//! # Relief
//!
//! Trains a multi-label classifier that tags short disaster-response
//! messages with the categories they belong to (water, medical help,
//! shelter, ...).
//!
//! ## Features
//!
//! - SQLite data loading through `sqlx`
//! - Configurable text analysis pipeline (stop words, noun lemmatization)
//! - Count and TF-IDF features over a sorted vocabulary
//! - One random forest per category, optionally trained in parallel
//! - Cross-validated grid search over forest parameters
//! - Per-category precision, recall and F1 on a held-out split
//! - Checksummed single-file model artifacts
//!
//! ```no_run
//! use relief::config::TrainingConfig;
//! use relief::ml::TrainedModel;
//! use relief::training::Trainer;
//!
//! # fn main() -> relief::error::Result<()> {
//! Trainer::new(TrainingConfig::default()).run("DisasterResponse.db", "classifier.rlf")?;
//!
//! let model = TrainedModel::load("classifier.rlf")?;
//! println!("{:?}", model.classify("We are thirsty, please send water")?);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ml;
pub mod training;

pub mod prelude {
    pub use crate::analysis::analyzer::{Analyzer, AnalyzerConfig, MessageAnalyzer};
    pub use crate::config::TrainingConfig;
    pub use crate::dataset::{Dataset, Example, LoaderConfig, SqliteLoader};
    pub use crate::error::{ReliefError, Result};
    pub use crate::ml::{
        Evaluator, EvaluationReport, ForestParams, GridSearch, LabelMatrix, MaxFeatures,
        ParamGrid, PipelineSpec, Scoring, TextClassificationPipeline, TrainedModel,
    };
    pub use crate::training::{ConsoleReporter, SilentReporter, Trainer};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
