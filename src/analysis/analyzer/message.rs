//! The message analyzer used for training and inference.
//!
//! [`MessageAnalyzer`] is a [`PipelineAnalyzer`] assembled from an
//! [`AnalyzerConfig`]:
//!
//! ```text
//! [^a-zA-Z0-9] → " "  →  whitespace split  →  stop words  →  lemma  →  lowercase  →  strip
//! ```
//!
//! The configuration, not the analyzer, is what gets persisted with a model:
//! loading a model rebuilds an identical analyzer from it.
//!
//! # Examples
//!
//! ```
//! use relief::analysis::analyzer::MessageAnalyzer;
//!
//! let analyzer = MessageAnalyzer::english().unwrap();
//! let tokens = analyzer.tokenize("Flood water rising near Main St!!").unwrap();
//!
//! assert_eq!(tokens, vec!["flood", "water", "rising", "near", "main", "st"]);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::lemma::{IdentityLemmatizer, LemmaFilter, MorphyLemmatizer};
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::remove_empty::RemoveEmptyFilter;
use crate::analysis::token_filter::stop::{StopFilter, StopWordMatching};
use crate::analysis::token_filter::strip::StripFilter;
use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;
use crate::error::Result;

/// Which stop words the analyzer removes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopWordConfig {
    /// The 179-word NLTK English list.
    #[default]
    English,
    /// A caller-supplied list.
    Custom(Vec<String>),
    /// No stop word removal.
    #[serde(rename = "none")]
    Disabled,
}

/// Lemmatization algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LemmatizerKind {
    /// WordNet-style noun lemmatizer.
    #[default]
    Morphy,
    /// Leaves tokens unchanged.
    Identity,
}

/// Lemmatizer settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LemmatizerConfig {
    pub kind: LemmatizerKind,
    /// Known base forms; restricts morphy candidates when present.
    pub lexicon: Option<Vec<String>>,
}

/// Configuration of the message analyzer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub stop_words: StopWordConfig,
    pub matching: StopWordMatching,
    pub lemmatizer: LemmatizerConfig,
}

/// The configured normalizer/tokenizer for disaster messages.
#[derive(Clone, Debug)]
pub struct MessageAnalyzer {
    config: AnalyzerConfig,
    inner: PipelineAnalyzer,
}

impl MessageAnalyzer {
    /// Build an analyzer from its configuration.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        let mut pipeline = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::non_alphanumeric()?))
            .with_name("message");

        let stop_filter = match &config.stop_words {
            StopWordConfig::English => Some(StopFilter::new()),
            StopWordConfig::Custom(words) => Some(StopFilter::from_words(words.iter().cloned())),
            StopWordConfig::Disabled => None,
        };
        let stop_filter = stop_filter.map(|filter| filter.with_matching(config.matching));
        if let Some(stop_filter) = &stop_filter {
            pipeline = pipeline.add_filter(Arc::new(stop_filter.clone()));
        }

        let mut lemma_filter = match (config.lemmatizer.kind, &config.lemmatizer.lexicon) {
            (LemmatizerKind::Morphy, None) => LemmaFilter::new(),
            (LemmatizerKind::Morphy, Some(lexicon)) => {
                LemmaFilter::with_lemmatizer(Box::new(MorphyLemmatizer::with_lexicon(lexicon)))
            }
            (LemmatizerKind::Identity, _) => {
                LemmaFilter::with_lemmatizer(Box::new(IdentityLemmatizer::new()))
            }
        };
        if let Some(stop_filter) = stop_filter {
            lemma_filter = lemma_filter.with_stop_guard(stop_filter);
        }

        let inner = pipeline
            .add_filter(Arc::new(lemma_filter))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(StripFilter::new()))
            .add_filter(Arc::new(RemoveEmptyFilter::new()));

        Ok(MessageAnalyzer { config, inner })
    }

    /// Analyzer with the default configuration.
    pub fn english() -> Result<Self> {
        Self::new(AnalyzerConfig::default())
    }

    /// The configuration this analyzer was built from.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Normalize and tokenize a message.
    pub fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|token| token.text).collect())
    }
}

impl Analyzer for MessageAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "message"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token_filter::stop::DEFAULT_ENGLISH_STOP_WORDS;

    #[test]
    fn test_flood_message() {
        let analyzer = MessageAnalyzer::english().unwrap();
        assert_eq!(
            analyzer.tokenize("Flood water rising near Main St!!").unwrap(),
            vec!["flood", "water", "rising", "near", "main", "st"]
        );
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        let analyzer = MessageAnalyzer::english().unwrap();
        assert!(analyzer.tokenize("").unwrap().is_empty());
        assert!(analyzer.tokenize("?!... ---").unwrap().is_empty());
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let analyzer = MessageAnalyzer::english().unwrap();
        assert_eq!(
            analyzer.tokenize("water, food, water and tents").unwrap(),
            vec!["water", "food", "water", "tent"]
        );
    }

    #[test]
    fn test_non_ascii_characters_split_tokens() {
        let analyzer = MessageAnalyzer::english().unwrap();
        assert_eq!(
            analyzer.tokenize("Port-au-Prince café").unwrap(),
            vec!["port", "au", "prince", "caf"]
        );
    }

    #[test]
    fn test_tokenize_is_idempotent() {
        let analyzer = MessageAnalyzer::english().unwrap();
        let messages = [
            "Flood water rising near Main St!!",
            "The families in the camps need tents, blankets and clean water.",
            "We are hungry!! Please send food & medicine to Leogane.",
            "Children and women are sleeping outside; the houses collapsed.",
            "Others are injured.  Earthquake victims NEED help",
        ];

        for message in messages {
            let once = analyzer.tokenize(message).unwrap();
            let twice = analyzer.tokenize(&once.join(" ")).unwrap();
            assert_eq!(once, twice, "not idempotent for {message:?}");
        }
    }

    #[test]
    fn test_lemma_that_is_a_stop_word_keeps_surface_form() {
        let analyzer = MessageAnalyzer::english().unwrap();
        let once = analyzer.tokenize("We need cans of food").unwrap();
        assert_eq!(once, vec!["need", "cans", "food"]);
        assert_eq!(analyzer.tokenize(&once.join(" ")).unwrap(), once);

        assert_eq!(
            analyzer.tokenize("Wills and outs").unwrap(),
            vec!["wills", "outs"]
        );
    }

    #[test]
    fn test_plural_of_every_stop_word_is_idempotent() {
        let analyzer = MessageAnalyzer::english().unwrap();
        for word in DEFAULT_ENGLISH_STOP_WORDS.iter().filter(|w| !w.contains('\'')) {
            let message = format!("need {word}s now");
            let once = analyzer.tokenize(&message).unwrap();
            let twice = analyzer.tokenize(&once.join(" ")).unwrap();
            assert_eq!(once, twice, "not idempotent for {message:?}");
        }
    }

    #[test]
    fn test_case_sensitive_matching_keeps_capitalized_stop_words() {
        let analyzer = MessageAnalyzer::new(AnalyzerConfig {
            matching: StopWordMatching::CaseSensitive,
            ..AnalyzerConfig::default()
        })
        .unwrap();

        assert_eq!(
            analyzer.tokenize("The roof is gone").unwrap(),
            vec!["the", "roof", "gone"]
        );
        assert_eq!(
            analyzer.tokenize("the roof is gone").unwrap(),
            vec!["roof", "gone"]
        );
    }

    #[test]
    fn test_custom_stop_words_and_identity_lemmatizer() {
        let analyzer = MessageAnalyzer::new(AnalyzerConfig {
            stop_words: StopWordConfig::Custom(vec!["please".to_string()]),
            lemmatizer: LemmatizerConfig {
                kind: LemmatizerKind::Identity,
                lexicon: None,
            },
            ..AnalyzerConfig::default()
        })
        .unwrap();

        assert_eq!(
            analyzer.tokenize("Please send the tents").unwrap(),
            vec!["send", "the", "tents"]
        );
    }

    #[test]
    fn test_disabled_stop_words() {
        let analyzer = MessageAnalyzer::new(AnalyzerConfig {
            stop_words: StopWordConfig::Disabled,
            ..AnalyzerConfig::default()
        })
        .unwrap();

        assert_eq!(analyzer.tokenize("the roof").unwrap(), vec!["the", "roof"]);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = AnalyzerConfig {
            stop_words: StopWordConfig::Disabled,
            matching: StopWordMatching::CaseSensitive,
            lemmatizer: LemmatizerConfig {
                kind: LemmatizerKind::Morphy,
                lexicon: Some(vec!["tent".to_string()]),
            },
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"none\""));
        let parsed: AnalyzerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);

        let partial: AnalyzerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(partial, AnalyzerConfig::default());
    }
}
