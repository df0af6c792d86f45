//! Token filter implementations for token transformation.
//!
//! Filters transform the token streams produced by tokenizers. The message
//! normalizer chains them in this order:
//!
//! ```text
//! Tokenizer → Stop Words → Lemmatizer → Lowercase → Strip → Remove Empty
//! ```
//!
//! # Available Filters
//!
//! - [`stop::StopFilter`] - Removes stop words
//! - [`lemma::LemmaFilter`] - Reduces words to their dictionary base form
//! - [`lowercase::LowercaseFilter`] - Converts tokens to lowercase
//! - [`strip::StripFilter`] - Trims surrounding whitespace
//! - [`remove_empty::RemoveEmptyFilter`] - Removes empty and stopped tokens
//!
//! # Examples
//!
//! ```
//! use relief::analysis::token_filter::Filter;
//! use relief::analysis::token_filter::lowercase::LowercaseFilter;
//! use relief::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("Flood", 0), Token::new("WATER", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].text, "flood");
//! assert_eq!(filtered[1].text, "water");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
///
/// Filters receive a stream of tokens and produce a new stream, allowing
/// them to modify, mark, or drop tokens. Implementations must not keep
/// mutable state between calls: the same filter instance is reused for
/// training and inference.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod lemma;
pub mod lowercase;
pub mod remove_empty;
pub mod stop;
pub mod strip;
