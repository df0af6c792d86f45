//! Lemmatizing token filter and lemmatizer implementations.
//!
//! Stop words are removed before lemmatization, so a lemma can turn out to
//! be a stop word ("cans" → "can"). A filter built with
//! [`LemmaFilter::with_stop_guard`] keeps the surface form in that case;
//! otherwise analyzing the analyzer's own output would drop the token.

use super::Filter;
use super::stop::StopFilter;
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for lemmatization algorithms.
///
/// A lemmatizer maps an inflected word to its dictionary base form. Every
/// implementation is stateless after construction, so one instance can be
/// shared between threads and between training and inference.
pub trait Lemmatizer: Send + Sync {
    /// Reduce a word to its base form.
    fn lemmatize(&self, word: &str) -> String;

    /// Get the name of this lemmatizer.
    fn name(&self) -> &'static str;
}

pub mod identity;
pub mod morphy;

pub use identity::IdentityLemmatizer;
pub use morphy::MorphyLemmatizer;

/// Filter that applies a lemmatizer to tokens.
pub struct LemmaFilter {
    /// The lemmatizer to use.
    lemmatizer: Box<dyn Lemmatizer>,
    /// Lemmas this filter refuses to produce.
    stop_guard: Option<StopFilter>,
}

impl std::fmt::Debug for LemmaFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LemmaFilter")
            .field("lemmatizer", &self.lemmatizer.name())
            .field("stop_guard", &self.stop_guard.is_some())
            .finish()
    }
}

impl LemmaFilter {
    /// Create a new lemma filter with the noun morphy lemmatizer.
    pub fn new() -> Self {
        Self::with_lemmatizer(Box::new(MorphyLemmatizer::new()))
    }

    /// Create a lemma filter with a custom lemmatizer.
    pub fn with_lemmatizer(lemmatizer: Box<dyn Lemmatizer>) -> Self {
        LemmaFilter {
            lemmatizer,
            stop_guard: None,
        }
    }

    /// Keep the surface form whenever the lemma is a stop word of `stop`.
    ///
    /// Lemmas are checked in lowercase, the form later filters give them.
    pub fn with_stop_guard(mut self, stop: StopFilter) -> Self {
        self.stop_guard = Some(stop);
        self
    }

    fn lemmatize(&self, word: &str) -> Option<String> {
        let lemma = self.lemmatizer.lemmatize(word);
        match &self.stop_guard {
            Some(stop) if stop.is_stop_word(&lemma.to_lowercase()) => None,
            _ => Some(lemma),
        }
    }
}

impl Default for LemmaFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for LemmaFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = tokens
            .map(|token| {
                if token.is_stopped() {
                    return token;
                }
                match self.lemmatize(&token.text) {
                    Some(lemma) => token.with_text(lemma),
                    None => token,
                }
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "lemma"
    }
}
