//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, ReliefArgs};
use crate::error::Result;
use crate::ml::forest::ForestParams;
use crate::ml::metrics::Scoring;
use crate::training::TrainingOutcome;

/// Held-out metrics of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Result structure for a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub database_path: String,
    pub model_path: String,
    pub model_id: String,
    pub n_train: usize,
    pub n_test: usize,
    pub vocabulary_size: usize,
    pub best_params: ForestParams,
    pub scoring: Scoring,
    pub best_cv_score: f64,
    pub subset_accuracy: f64,
    pub hamming_accuracy: f64,
    pub macro_f1: f64,
    pub micro_f1: f64,
    pub categories: Vec<CategorySummary>,
    pub duration_ms: u64,
}

impl TrainingSummary {
    pub fn from_outcome(outcome: &TrainingOutcome) -> Self {
        let metadata = outcome.model.metadata();
        let report = &outcome.report;
        TrainingSummary {
            database_path: outcome.database_path.to_string_lossy().to_string(),
            model_path: outcome.model_path.to_string_lossy().to_string(),
            model_id: metadata.id.to_string(),
            n_train: metadata.n_train,
            n_test: metadata.n_test,
            vocabulary_size: metadata.vocabulary_size,
            best_params: *outcome.model.best_params(),
            scoring: metadata.scoring,
            best_cv_score: metadata.best_cv_score,
            subset_accuracy: report.subset_accuracy,
            hamming_accuracy: report.hamming_accuracy,
            macro_f1: report.macro_f1,
            micro_f1: report.micro_f1,
            categories: report
                .categories
                .iter()
                .map(|c| CategorySummary {
                    name: c.name.clone(),
                    precision: c.positive.precision,
                    recall: c.positive.recall,
                    f1: c.positive.f1,
                    support: c.support(),
                })
                .collect(),
            duration_ms: outcome.duration_ms,
        }
    }
}

/// Output a training summary in the specified format.
pub fn output_summary(summary: &TrainingSummary, args: &ReliefArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(summary, args),
        OutputFormat::Json => output_json(summary, args),
    }
}

/// Output in human-readable format.
fn output_human(summary: &TrainingSummary, args: &ReliefArgs) -> Result<()> {
    if args.verbosity() == 0 {
        return Ok(());
    }
    println!();
    println!("Training Summary:");
    println!("═════════════════");
    println!("Model ID: {}", summary.model_id);
    println!(
        "Messages: {} train / {} test",
        summary.n_train, summary.n_test
    );
    println!("Vocabulary: {} terms", summary.vocabulary_size);
    println!("Best parameters: {}", summary.best_params);
    println!("Best CV {}: {:.4}", summary.scoring, summary.best_cv_score);
    if args.verbosity() > 1 {
        println!("Held-out micro F1: {:.4}", summary.micro_f1);
        println!("Duration: {}ms", summary.duration_ms);
    }
    Ok(())
}

/// Output in JSON format.
fn output_json(summary: &TrainingSummary, args: &ReliefArgs) -> Result<()> {
    println!("{}", render_json(summary, args.pretty)?);
    Ok(())
}

/// Serialize `summary` as compact or pretty JSON.
pub fn render_json(summary: &TrainingSummary, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(summary)?
    } else {
        serde_json::to_string(summary)?
    };
    Ok(json)
}
