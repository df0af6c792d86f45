//! Text analysis for disaster messages.
//!
//! This module turns raw message text into normalized tokens. The building
//! blocks are char filters, a tokenizer and token filters, composed by an
//! [`analyzer::PipelineAnalyzer`]. [`analyzer::MessageAnalyzer`] is the
//! configured pipeline used for training and inference.

pub mod analyzer;
pub mod char_filter;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
