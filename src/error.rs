//! Error types for the Relief library.
//!
//! All errors are represented by the [`ReliefError`] enum. Every fallible
//! operation in the training pipeline returns [`Result`], and errors propagate
//! unchanged to the top-level invocation. Nothing in the pipeline retries:
//! a failed run has to be started again from scratch.
//!
//! # Examples
//!
//! ```
//! use relief::error::{ReliefError, Result};
//!
//! fn load() -> Result<()> {
//!     Err(ReliefError::data_source("table `messages` not found"))
//! }
//!
//! match load() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Relief operations.
#[derive(Error, Debug)]
pub enum ReliefError {
    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input database is unreachable, malformed, or missing expected columns.
    #[error("Data source error: {0}")]
    DataSource(String),

    /// A message or label value is missing where a value is required.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A category has a single distinct value in the training data.
    ///
    /// This is not fatal: the classifier for the column degenerates to a
    /// constant predictor. The variant exists so the condition can be
    /// reported through the same channel as every other pipeline condition.
    #[error("Degenerate label column `{column}`: only one distinct value in training data")]
    DegenerateLabelColumn { column: String },

    /// Any failure while fitting or applying a pipeline stage.
    #[error("Fit error: {0}")]
    Fit(String),

    /// The model artifact cannot be written, read, or verified.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Invalid configuration (grid, folds, fractions).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analysis-related errors (analyzer construction)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with ReliefError.
pub type Result<T> = std::result::Result<T, ReliefError>;

impl ReliefError {
    /// Create a new data source error.
    pub fn data_source<S: Into<String>>(msg: S) -> Self {
        ReliefError::DataSource(msg.into())
    }

    /// Create a new invalid input error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        ReliefError::InvalidInput(msg.into())
    }

    /// Create a new degenerate label column error.
    pub fn degenerate_column<S: Into<String>>(column: S) -> Self {
        ReliefError::DegenerateLabelColumn {
            column: column.into(),
        }
    }

    /// Create a new fit error.
    pub fn fit<S: Into<String>>(msg: S) -> Self {
        ReliefError::Fit(msg.into())
    }

    /// Create a new "not fitted" error for the named stage.
    pub fn not_fitted(stage: &str) -> Self {
        ReliefError::Fit(format!("{stage} used before fit"))
    }

    /// Create a new persistence error.
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        ReliefError::Persistence(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ReliefError::Config(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        ReliefError::Analysis(msg.into())
    }

    /// Whether the error should abort a training run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ReliefError::DegenerateLabelColumn { .. })
    }
}

impl From<sqlx::Error> for ReliefError {
    fn from(err: sqlx::Error) -> Self {
        ReliefError::DataSource(err.to_string())
    }
}

impl From<bincode::Error> for ReliefError {
    fn from(err: bincode::Error) -> Self {
        ReliefError::Persistence(err.to_string())
    }
}
