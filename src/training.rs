//! End-to-end training run.
//!
//! [`Trainer::run`] loads the dataset, splits it, selects forest parameters
//! with a cross-validated grid search, evaluates the chosen pipeline on the
//! held-out split and saves the model. Any error aborts the run before
//! anything is written.

use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;

use crate::config::TrainingConfig;
use crate::dataset::{Dataset, SqliteLoader};
use crate::error::Result;
use crate::ml::evaluation::{EvaluationReport, Evaluator};
use crate::ml::grid_search::GridSearch;
use crate::ml::model::{ModelMetadata, TrainedModel};

/// Receives human-readable progress of a training run.
pub trait ProgressReporter: Send + Sync {
    /// A run stage has started.
    fn stage(&self, message: &str);

    /// The held-out evaluation is available.
    fn report(&self, report: &EvaluationReport);
}

/// Prints progress and the evaluation report to stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn stage(&self, message: &str) {
        println!("{message}");
    }

    fn report(&self, report: &EvaluationReport) {
        println!("{report}");
    }
}

/// Discards all progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn stage(&self, _message: &str) {}

    fn report(&self, _report: &EvaluationReport) {}
}

/// What a successful run produced.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub model: TrainedModel,
    pub report: EvaluationReport,
    pub database_path: PathBuf,
    pub model_path: PathBuf,
    pub duration_ms: u64,
}

/// Drives a training run with a fixed configuration.
pub struct Trainer {
    config: TrainingConfig,
    reporter: Box<dyn ProgressReporter>,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Trainer {
            config,
            reporter: Box::new(ConsoleReporter),
        }
    }

    pub fn with_reporter<R: ProgressReporter + 'static>(mut self, reporter: R) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Load, train, evaluate and save.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        database: P,
        model_path: Q,
    ) -> Result<TrainingOutcome> {
        let start = Instant::now();
        let database = database.as_ref();
        let model_path = model_path.as_ref();
        self.config.validate()?;

        self.reporter
            .stage(&format!("Loading data...\n    DATABASE: {}", database.display()));
        let dataset = SqliteLoader::new(self.config.loader.clone()).load_blocking(database)?;

        let (model, report) = self.train(&dataset)?;

        self.reporter
            .stage(&format!("Saving model...\n    MODEL: {}", model_path.display()));
        model.save(model_path)?;
        self.reporter.stage("Trained model saved!");

        Ok(TrainingOutcome {
            model,
            report,
            database_path: database.to_path_buf(),
            model_path: model_path.to_path_buf(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Split, search, refit and evaluate on an in-memory dataset.
    pub fn train(&self, dataset: &Dataset) -> Result<(TrainedModel, EvaluationReport)> {
        self.config.validate()?;
        let (train, test) = dataset.train_test_split(self.config.test_fraction, self.config.split_seed)?;

        self.reporter.stage("Building model...");
        let search = GridSearch::new(self.config.pipeline_spec(), self.config.grid.clone())
            .with_cv(self.config.cv)
            .with_scoring(self.config.scoring)
            .with_parallel(self.config.parallel)
            .with_category_names(dataset.category_names().to_vec());

        self.reporter.stage("Training model...");
        info!(
            "Training on {} messages, holding out {}",
            train.len(),
            test.len()
        );
        let results = search.fit(&train.texts(), &train.label_matrix())?;

        self.reporter.stage("Evaluating model...");
        let predicted = results.best_pipeline.predict(&test.texts())?;
        let report = Evaluator::new(dataset.category_names().to_vec())
            .evaluate(&test.label_matrix(), &predicted)?;
        self.reporter.report(&report);
        info!(
            "Held-out subset accuracy {:.4}, micro F1 {:.4}",
            report.subset_accuracy, report.micro_f1
        );

        let metadata =
            ModelMetadata::from_search(&results, self.config.scoring, train.len(), test.len());
        let model = TrainedModel::new(
            results.best_pipeline,
            dataset.category_names().to_vec(),
            metadata,
        )?;
        Ok((model, report))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::dataset::Example;
    use crate::ml::cross_validation::KFold;
    use crate::ml::grid_search::{GridAxis, ParamGrid};

    #[derive(Clone, Default)]
    struct Recorder {
        stages: Arc<Mutex<Vec<String>>>,
    }

    impl ProgressReporter for Recorder {
        fn stage(&self, message: &str) {
            self.stages.lock().unwrap().push(message.to_string());
        }

        fn report(&self, _report: &EvaluationReport) {}
    }

    /// 100 messages; `medical_help` is positive for every 20th one.
    fn dataset() -> Dataset {
        let examples = (0..100)
            .map(|i| {
                let water = i % 2 == 0;
                let medical = i % 20 == 0;
                let mut text = if water {
                    format!("We need water in sector {}", i % 7)
                } else {
                    format!("Road blocked near bridge {}", i % 7)
                };
                if medical {
                    text.push_str(" injured doctor");
                }
                Example::new(text, vec![water, medical, false])
            })
            .collect();
        Dataset::new(
            vec![
                "water".to_string(),
                "medical_help".to_string(),
                "child_alone".to_string(),
            ],
            examples,
        )
        .unwrap()
    }

    fn config() -> TrainingConfig {
        TrainingConfig {
            grid: ParamGrid::new().with_axis(GridAxis::MaxDepth(vec![Some(5), Some(10)])),
            cv: KFold::new(3),
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_train_reports_every_category() {
        let dataset = dataset();
        let recorder = Recorder::default();
        let trainer = Trainer::new(config()).with_reporter(recorder.clone());
        let (model, report) = trainer.train(&dataset).unwrap();

        let (_, test) = dataset.train_test_split(0.2, 42).unwrap();
        assert_eq!(test.len(), 20);
        assert_eq!(report.categories.len(), 3);
        assert_eq!(
            report.category("medical_help").unwrap().support(),
            test.positive_counts()[1]
        );
        assert_eq!(report.category("child_alone").unwrap().support(), 0);

        assert_eq!(model.metadata().n_train, 80);
        assert_eq!(model.metadata().n_test, 20);
        assert_eq!(model.metadata().cv_results.len(), 2);
        assert_eq!(
            *recorder.stages.lock().unwrap(),
            vec!["Building model...", "Training model...", "Evaluating model..."]
        );
    }

    #[test]
    fn test_invalid_config_aborts() {
        let trainer = Trainer::new(TrainingConfig {
            test_fraction: 0.0,
            ..config()
        })
        .with_reporter(SilentReporter);
        assert!(trainer.train(&dataset()).is_err());
    }

    #[test]
    fn test_missing_database_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.rlf");
        let trainer = Trainer::new(config()).with_reporter(SilentReporter);

        let result = trainer.run(dir.path().join("missing.db"), &model_path);
        assert!(result.is_err());
        assert!(!model_path.exists());
    }
}
