//! Lowercase filter implementation.
//!
//! Runs after lemmatization, so "Families" and "families" both reach the
//! vocabulary as "family". Lowercasing is Unicode-aware, although messages
//! only hold ASCII letters and digits by the time they get here.
//!
//! # Examples
//!
//! ```
//! use relief::analysis::token_filter::Filter;
//! use relief::analysis::token_filter::lowercase::LowercaseFilter;
//! use relief::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("Leogane", 0), Token::new("URGENT", 1)];
//! let lowered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//!
//! assert_eq!(lowered, vec!["leogane", "urgent"]);
//! ```

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Converts token text to lowercase.
///
/// Stopped tokens keep their text; [`RemoveEmptyFilter`] drops them later.
///
/// [`RemoveEmptyFilter`]: crate::analysis::token_filter::remove_empty::RemoveEmptyFilter
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    /// Create a new lowercase filter.
    pub fn new() -> Self {
        LowercaseFilter
    }
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = tokens
            .map(|token| {
                if token.is_stopped() {
                    token
                } else {
                    let lowered = token.text.to_lowercase();
                    token.with_text(lowered)
                }
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}
