//! Noun lemmatizer modelled on WordNet's `morphy`.
//!
//! Lemmatization is part-of-speech independent: every token is treated as a
//! noun. The lemmatizer works in three layers:
//!
//! 1. An exception table of irregular plurals (`children` → `child`).
//! 2. The WordNet noun detachment rules (`-ies` → `-y`, `-ches` → `-ch`, ...).
//! 3. Candidate selection. With a lexicon of known base forms, only
//!    candidates found in the lexicon are accepted (shortest wins), which is
//!    what WordNet does. Without a lexicon, guards on invariant endings
//!    (`-ss`, `-us`, `-is`) and a short list of invariant words stand in for
//!    the dictionary check.
//!
//! Outputs are lowercase and are fixed points: lemmatizing a lemma returns it
//! unchanged.
//!
//! # Examples
//!
//! ```
//! use relief::analysis::token_filter::lemma::Lemmatizer;
//! use relief::analysis::token_filter::lemma::morphy::MorphyLemmatizer;
//!
//! let lemmatizer = MorphyLemmatizer::new();
//!
//! assert_eq!(lemmatizer.lemmatize("families"), "family");
//! assert_eq!(lemmatizer.lemmatize("churches"), "church");
//! assert_eq!(lemmatizer.lemmatize("rising"), "rising");
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};

use crate::analysis::token_filter::lemma::Lemmatizer;

/// Irregular noun plurals.
const NOUN_EXCEPTIONS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("firemen", "fireman"),
    ("policemen", "policeman"),
    ("fishermen", "fisherman"),
    ("gentlemen", "gentleman"),
    ("chairmen", "chairman"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("oxen", "ox"),
    ("lives", "life"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("wolves", "wolf"),
    ("halves", "half"),
    ("shelves", "shelf"),
    ("thieves", "thief"),
    ("loaves", "loaf"),
    ("calves", "calf"),
    ("heroes", "hero"),
    ("potatoes", "potato"),
    ("tomatoes", "tomato"),
    ("volcanoes", "volcano"),
    ("echoes", "echo"),
    ("crises", "crisis"),
    ("analyses", "analysis"),
    ("diagnoses", "diagnosis"),
    ("phenomena", "phenomenon"),
    ("criteria", "criterion"),
    ("data", "datum"),
    ("media", "medium"),
];

/// Words that end like plurals but are their own base form.
const INVARIANT_NOUNS: &[&str] = &[
    "news",
    "series",
    "species",
    "means",
    "physics",
    "politics",
    "economics",
    "mathematics",
    "aids",
    "diabetes",
    "measles",
    "rabies",
    "mumps",
    "scissors",
    "trousers",
    "clothes",
    "thanks",
    "always",
    "perhaps",
    "whereas",
    "various",
    "towards",
    "afterwards",
    "besides",
    "unless",
    "others",
    "yes",
];

/// WordNet noun detachment rules, in WordNet's order.
const NOUN_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

static EXCEPTIONS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| NOUN_EXCEPTIONS.iter().copied().collect());

static INVARIANTS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| INVARIANT_NOUNS.iter().copied().collect());

/// WordNet-style noun lemmatizer.
#[derive(Debug, Clone, Default)]
pub struct MorphyLemmatizer {
    /// Known base forms. When present, candidates must be in this set.
    lexicon: Option<Arc<HashSet<String>>>,
}

impl MorphyLemmatizer {
    /// Create a lemmatizer that uses the rule guards instead of a lexicon.
    pub fn new() -> Self {
        MorphyLemmatizer { lexicon: None }
    }

    /// Create a lemmatizer that only accepts candidates found in `lexicon`.
    pub fn with_lexicon<I, S>(lexicon: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lexicon = lexicon
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();
        MorphyLemmatizer {
            lexicon: Some(Arc::new(lexicon)),
        }
    }

    /// Whether this lemmatizer checks candidates against a lexicon.
    pub fn has_lexicon(&self) -> bool {
        self.lexicon.is_some()
    }

    fn lemmatize_lowercase(&self, word: &str) -> Option<String> {
        if let Some(base) = EXCEPTIONS.get(word) {
            return Some((*base).to_string());
        }

        match &self.lexicon {
            Some(lexicon) => Self::lookup(word, lexicon),
            None => Self::apply_guarded_rules(word),
        }
    }

    /// WordNet behaviour: the word itself if known, else the shortest
    /// known candidate.
    fn lookup(word: &str, lexicon: &HashSet<String>) -> Option<String> {
        if lexicon.contains(word) {
            return None;
        }

        NOUN_RULES
            .iter()
            .filter_map(|(suffix, replacement)| Self::detach(word, suffix, replacement))
            .filter(|candidate| lexicon.contains(candidate))
            .min_by_key(|candidate| candidate.len())
    }

    fn apply_guarded_rules(word: &str) -> Option<String> {
        if word.len() <= 3
            || INVARIANTS.contains(word)
            || !word.chars().all(|c| c.is_ascii_alphabetic())
            || word.ends_with("ss")
            || word.ends_with("us")
            || word.ends_with("is")
        {
            return None;
        }

        if word.ends_with("ies") && word.len() > 4 {
            return Self::detach(word, "ies", "y");
        }
        if word.ends_with("sses") || word.ends_with("zzes") {
            return Self::detach(word, "es", "");
        }
        for (suffix, replacement) in [("xes", "x"), ("ches", "ch"), ("shes", "sh")] {
            if word.ends_with(suffix) {
                return Self::detach(word, suffix, replacement);
            }
        }
        // "-ses" and "-zes" are more often "-se"/"-ze" nouns (houses, sizes)
        // than "-s"/"-z" nouns, so they fall through to the plain "-s" rule.
        Self::detach(word, "s", "")
    }

    fn detach(word: &str, suffix: &str, replacement: &str) -> Option<String> {
        let stem = word.strip_suffix(suffix)?;
        if stem.is_empty() {
            return None;
        }
        Some(format!("{stem}{replacement}"))
    }
}

impl Lemmatizer for MorphyLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        let lowered = word.to_lowercase();
        match self.lemmatize_lowercase(&lowered) {
            Some(lemma) => lemma,
            None => word.to_string(),
        }
    }

    fn name(&self) -> &'static str {
        "morphy"
    }
}
