//! Strip filter implementation.
//!
//! The whitespace tokenizer never emits padded tokens, but lemmatizers and
//! custom char filters may. Trimming here keeps " water" and "water" on the
//! same vocabulary column.
//!
//! # Examples
//!
//! ```
//! use relief::analysis::token_filter::Filter;
//! use relief::analysis::token_filter::strip::StripFilter;
//! use relief::analysis::token::Token;
//!
//! let filter = StripFilter::new();
//! let tokens = vec![Token::new(" water ", 0), Token::new("\t", 1)];
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(result[0].text, "water");
//! assert!(result[1].is_stopped());
//! ```

use super::Filter;
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trims surrounding whitespace from each token.
///
/// A token that is blank after trimming is marked as stopped and keeps its
/// original text; it never reaches the vectorizer.
#[derive(Clone, Debug, Default)]
pub struct StripFilter;

impl StripFilter {
    /// Create a new strip filter.
    pub fn new() -> Self {
        StripFilter
    }
}

impl Filter for StripFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = tokens
            .map(|token| {
                if token.is_stopped() {
                    token
                } else {
                    let trimmed = token.text.trim().to_string();
                    if trimmed.is_empty() {
                        token.stop()
                    } else {
                        token.with_text(trimmed)
                    }
                }
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "strip"
    }
}
