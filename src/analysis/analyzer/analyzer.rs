//! Core analyzer trait definition.
//!
//! Analyzers are the complete text processing pipeline:
//!
//! ```text
//! Raw Message → Analyzer → Token Stream → Count Vectorizer
//!                  ↓
//!             Char Filters
//!                  ↓
//!              Tokenizer
//!                  ↓
//!            Token Filters
//! ```
//!
//! # Examples
//!
//! ```
//! use relief::analysis::analyzer::Analyzer;
//! use relief::analysis::token::TokenStream;
//! use relief::error::Result;
//!
//! struct NothingAnalyzer;
//!
//! impl Analyzer for NothingAnalyzer {
//!     fn analyze(&self, _text: &str) -> Result<TokenStream> {
//!         Ok(Box::new(std::iter::empty()))
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "nothing"
//!     }
//! }
//!
//! assert_eq!(NothingAnalyzer.analyze("help").unwrap().count(), 0);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// # Thread Safety
///
/// The trait requires `Send + Sync`: a single analyzer is shared, read-only,
/// by every cross-validation fold and per-label worker of a training run.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    ///
    /// This performs the complete analysis pipeline, including char
    /// filtering, tokenization and all configured token filters.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;
}
