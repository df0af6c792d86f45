//! Training run configuration.
//!
//! Every field has a default, so a configuration file only needs the
//! settings it changes:
//!
//! ```json
//! {
//!   "forest": { "n_estimators": 50 },
//!   "grid": [{ "max_depth": [5, 10, null] }],
//!   "cv": { "n_splits": 3 },
//!   "parallel": true
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::AnalyzerConfig;
use crate::dataset::LoaderConfig;
use crate::dataset::split::DEFAULT_TEST_FRACTION;
use crate::error::{ReliefError, Result};
use crate::ml::cross_validation::KFold;
use crate::ml::forest::ForestParams;
use crate::ml::grid_search::ParamGrid;
use crate::ml::metrics::Scoring;
use crate::ml::pipeline::PipelineSpec;
use crate::ml::tfidf::TfIdfConfig;

/// Default seed of the train/test shuffle.
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// All settings of a training run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub loader: LoaderConfig,
    pub analyzer: AnalyzerConfig,
    pub tfidf: TfIdfConfig,
    /// Base forest parameters; grid axes override individual fields.
    pub forest: ForestParams,
    pub grid: ParamGrid,
    pub cv: KFold,
    pub scoring: Scoring,
    pub test_fraction: f64,
    pub split_seed: u64,
    /// Use the rayon pool for per-label fitting and grid candidates.
    pub parallel: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            loader: LoaderConfig::default(),
            analyzer: AnalyzerConfig::default(),
            tfidf: TfIdfConfig::default(),
            forest: ForestParams::default(),
            grid: ParamGrid::default(),
            cv: KFold::default(),
            scoring: Scoring::default(),
            test_fraction: DEFAULT_TEST_FRACTION,
            split_seed: DEFAULT_SPLIT_SEED,
            parallel: false,
        }
    }
}

impl TrainingConfig {
    /// Read a JSON configuration file and validate it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| {
            ReliefError::config(format!("cannot read {}: {err}", path.display()))
        })?;
        let config: TrainingConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ReliefError::config(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        self.loader.validate()?;
        self.forest.validate()?;
        self.grid.validate()?;
        self.cv.validate()
    }

    /// Stage settings shared by every pipeline of the run.
    pub fn pipeline_spec(&self) -> PipelineSpec {
        PipelineSpec {
            analyzer: self.analyzer.clone(),
            tfidf: self.tfidf,
            forest: self.forest,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::ml::forest::MaxFeatures;
    use crate::ml::grid_search::GridAxis;

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.split_seed, 42);
        assert_eq!(config.cv.n_splits, 5);
        assert_eq!(config.forest.random_state, 13);
        assert_eq!(config.loader.table, "disaster_data_cleaned");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"forest": {{"n_estimators": 3}}, "grid": [{{"max_features": ["log2"]}}], "parallel": true}}"#
        )
        .unwrap();

        let config = TrainingConfig::from_file(file.path()).unwrap();
        assert_eq!(config.forest.n_estimators, 3);
        assert_eq!(config.forest.min_samples_split, 2);
        assert_eq!(
            config.grid,
            ParamGrid::new().with_axis(GridAxis::MaxFeatures(vec![MaxFeatures::Log2]))
        );
        assert!(config.parallel);
        assert_eq!(config.cv, KFold::default());
    }

    #[test]
    fn test_invalid_values() {
        let config = TrainingConfig {
            test_fraction: 1.0,
            ..TrainingConfig::default()
        };
        assert!(matches!(config.validate(), Err(ReliefError::Config(_))));

        let config = TrainingConfig {
            cv: KFold::new(1),
            ..TrainingConfig::default()
        };
        assert!(matches!(config.validate(), Err(ReliefError::Config(_))));

        let config = TrainingConfig {
            grid: ParamGrid::new().with_axis(GridAxis::MaxDepth(vec![])),
            ..TrainingConfig::default()
        };
        assert!(matches!(config.validate(), Err(ReliefError::Config(_))));
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            TrainingConfig::from_file(file.path()),
            Err(ReliefError::Json(_))
        ));
        assert!(matches!(
            TrainingConfig::from_file("/nonexistent/relief.json"),
            Err(ReliefError::Config(_))
        ));
    }
}
