//! Command implementations for the relief CLI.

use crate::cli::args::{OutputFormat, ReliefArgs};
use crate::cli::output::{TrainingSummary, output_summary};
use crate::config::TrainingConfig;
use crate::error::Result;
use crate::training::{ConsoleReporter, SilentReporter, Trainer};

/// Execute a training run from parsed arguments.
pub fn execute_command(args: ReliefArgs) -> Result<()> {
    let config = load_config(&args)?;
    let trainer = Trainer::new(config);
    let trainer = if args.output_format == OutputFormat::Human && args.verbosity() > 0 {
        trainer.with_reporter(ConsoleReporter)
    } else {
        trainer.with_reporter(SilentReporter)
    };

    let outcome = trainer.run(&args.database_path, &args.model_path)?;
    output_summary(&TrainingSummary::from_outcome(&outcome), &args)
}

/// Read the configuration file named on the command line, or use defaults.
pub fn load_config(args: &ReliefArgs) -> Result<TrainingConfig> {
    match &args.config {
        Some(path) => {
            if args.verbosity() > 1 && args.output_format == OutputFormat::Human {
                println!("Loading configuration from: {}", path.display());
            }
            TrainingConfig::from_file(path)
        }
        None => Ok(TrainingConfig::default()),
    }
}
