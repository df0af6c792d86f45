//! Command line argument parsing for the relief CLI using clap.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// Relief - train a multi-label disaster message classifier
#[derive(Parser, Debug, Clone)]
#[command(name = "relief")]
#[command(about = "Train a multi-label disaster message classifier from a SQLite database")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct ReliefArgs {
    /// SQLite database holding the cleaned messages
    #[arg(value_name = "DATABASE_PATH")]
    pub database_path: PathBuf,

    /// Where to write the trained model
    #[arg(value_name = "MODEL_PATH")]
    pub model_path: PathBuf,

    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Training configuration file (JSON)
    #[arg(short, long, value_name = "FILE", env = "RELIEF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl ReliefArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Progress and per-category report
    Human,
    /// Training summary as JSON
    Json,
}
