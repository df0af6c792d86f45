use regex::{NoExpand, Regex};

use super::CharFilter;
use crate::error::{ReliefError, Result};

/// Pattern matching every character outside `[A-Za-z0-9]`.
pub const NON_ALPHANUMERIC_PATTERN: &str = r"[^a-zA-Z0-9]";

/// A char filter that replaces every match of a regex pattern.
#[derive(Clone, Debug)]
pub struct PatternReplaceCharFilter {
    pattern: Regex,
    replacement: String,
}

impl PatternReplaceCharFilter {
    /// Create a new pattern replace char filter.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)
                .map_err(|e| ReliefError::analysis(format!("Invalid regex pattern: {e}")))?,
            replacement: replacement.to_string(),
        })
    }

    /// Replace each non-ASCII-alphanumeric character with a single space.
    pub fn non_alphanumeric() -> Result<Self> {
        Self::new(NON_ALPHANUMERIC_PATTERN, " ")
    }

    /// Get the regex pattern used by this filter.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl CharFilter for PatternReplaceCharFilter {
    fn filter(&self, input: &str) -> String {
        self.pattern
            .replace_all(input, NoExpand(&self.replacement))
            .into_owned()
    }

    fn name(&self) -> &'static str {
        "pattern_replace"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_replace() {
        let filter = PatternReplaceCharFilter::new(r"(\d+)", "NUM").unwrap();
        assert_eq!(filter.filter("Year 2024"), "Year NUM");
    }

    #[test]
    fn test_replacement_is_literal() {
        let filter = PatternReplaceCharFilter::new(r"-", "$1").unwrap();
        assert_eq!(filter.filter("a-b"), "a$1b");
    }

    #[test]
    fn test_non_alphanumeric_one_space_per_char() {
        let filter = PatternReplaceCharFilter::non_alphanumeric().unwrap();
        assert_eq!(
            filter.filter("Flood water rising near Main St!!"),
            "Flood water rising near Main St  "
        );
        assert_eq!(filter.filter("don't"), "don t");
        assert_eq!(filter.filter("café"), "caf ");
        assert_eq!(filter.filter(""), "");
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(PatternReplaceCharFilter::new("(", " ").is_err());
    }
}
