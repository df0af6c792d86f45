//! Analyzer implementations that combine char filters, tokenizers and filters.

#[allow(clippy::module_inception)]
pub mod analyzer;
pub mod message;
pub mod pipeline;

pub use analyzer::Analyzer;
pub use message::{AnalyzerConfig, LemmatizerConfig, MessageAnalyzer, StopWordConfig};
pub use pipeline::PipelineAnalyzer;
