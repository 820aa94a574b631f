use crate::error::{NameForgeError, NfResult};
use std::collections::HashSet;

/// Never allowed as a generated segment.
pub const BLOCKED_WORDS: &[&str] = &[
    "ass", "cum", "die", "fat", "fag", "gay", "god", "hoe", "nig", "pee", "pig", "poo", "sex",
    "shit", "slut", "tit", "tits", "damn", "dick", "dumb", "fuck", "hell", "homo", "jerk", "kill",
    "piss", "porn", "rape", "scum", "thot", "twat", "wank", "bitch", "whore", "penis", "pussy",
];

/// Shortest dictionary word that is filtered.
pub const MIN_DICTIONARY_WORD: usize = 4;

const EMBEDDED_ENGLISH_WORDS: &str = include_str!("../data/english_words.txt");

/// Rejects segments that spell offensive or common English words.
#[derive(Debug, Clone)]
pub struct WordFilter {
    blocked: HashSet<String>,
    dictionary: HashSet<String>,
    allow_words: bool,
}

impl WordFilter {
    pub fn new(allow_words: bool) -> Self {
        Self::with_dictionary(EMBEDDED_ENGLISH_WORDS.lines(), allow_words)
    }

    pub fn with_dictionary<I, S>(words: I, allow_words: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dictionary = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_ascii_lowercase())
            .filter(|w| !w.starts_with('#') && w.len() >= MIN_DICTIONARY_WORD)
            .collect();
        Self {
            blocked: BLOCKED_WORDS.iter().map(|w| w.to_string()).collect(),
            dictionary,
            allow_words,
        }
    }

    pub fn is_rejected(&self, segment: &str) -> bool {
        let word = segment.to_ascii_lowercase();
        if self.blocked.contains(&word) {
            return true;
        }
        !self.allow_words && self.dictionary.contains(&word)
    }

    pub fn check(&self, segment: &str) -> NfResult<()> {
        if self.is_rejected(segment) {
            Err(NameForgeError::DictionaryRejection {
                word: segment.to_string(),
            })
        } else {
            Ok(())
        }
    }

    pub fn dictionary_len(&self) -> usize {
        self.dictionary.len()
    }
}

impl Default for WordFilter {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dictionary_and_override() {
        let strict = WordFilter::new(false);
        let lax = WordFilter::new(true);
        assert!(strict.is_rejected("Water"));
        assert!(!lax.is_rejected("water"));
        assert!(!strict.is_rejected("dorel"));
        assert!(strict.dictionary_len() > 500);
    }

    #[test]
    fn test_blocked_words_ignore_override() {
        let lax = WordFilter::new(true);
        assert!(lax.is_rejected("hell"));
        assert!(matches!(
            lax.check("pig"),
            Err(NameForgeError::DictionaryRejection { .. })
        ));
    }

    #[test]
    fn test_short_words_pass_dictionary() {
        let filter = WordFilter::with_dictionary(["cat", "lion"], false);
        assert!(!filter.is_rejected("cat"));
        assert!(filter.is_rejected("lion"));
    }
}
