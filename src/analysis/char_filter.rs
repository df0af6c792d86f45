//! Char filter implementations for text normalization.
//!
//! Char filters pre-process the raw message string before it is passed to
//! the tokenizer. Messages are cleaned here (punctuation and symbols
//! collapsed to spaces) so that the tokenizer only has to split on
//! whitespace.
//!
//! # Available Filters
//!
//! - [`pattern_replace::PatternReplaceCharFilter`] - Regex-based replacement
//!
//! # Examples
//!
//! ```
//! use relief::analysis::char_filter::CharFilter;
//! use relief::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
//!
//! let filter = PatternReplaceCharFilter::non_alphanumeric().unwrap();
//! assert_eq!(filter.filter("Help!! now"), "Help   now");
//! ```

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text and return the filtered text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod pattern_replace;
