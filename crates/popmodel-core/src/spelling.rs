//! Best-effort word-level spelling normalization.
//!
//! Inbound plain text is split on whitespace; each token the dictionary
//! flags as misspelled is replaced with its first suggestion, falling back
//! to the original token when no suggestion exists. Image payloads are
//! never touched. When the dictionary is unavailable the text passes
//! through unchanged.

/// Dictionary backend used by the normalizer.
///
/// The concrete implementation lives in `popmodel-infra` (embedded word
/// list ranked by string similarity).
pub trait Dictionary: Send + Sync {
    /// Whether the dictionary considers this token misspelled.
    ///
    /// An unavailable dictionary must report `false` for everything so the
    /// normalizer degrades to identity.
    fn is_misspelled(&self, word: &str) -> bool;

    /// Best correction for a misspelled token, if any.
    fn suggest(&self, word: &str) -> Option<String>;
}

/// Correct each whitespace-separated token and rejoin with single spaces.
///
/// Only lowercase, purely alphabetic tokens are checked; capitalized
/// tokens (likely proper nouns) and tokens carrying digits or punctuation
/// pass through untouched.
pub fn correct_text<D: Dictionary>(dictionary: &D, text: &str) -> String {
    text.split_whitespace()
        .map(|token| correct_token(dictionary, token))
        .collect::<Vec<_>>()
        .join(" ")
}

fn correct_token<D: Dictionary>(dictionary: &D, token: &str) -> String {
    let checkable = !token.is_empty()
        && token.chars().all(|c| c.is_ascii_lowercase())
        && token.len() > 1;
    if checkable && dictionary.is_misspelled(token) {
        return dictionary.suggest(token).unwrap_or_else(|| token.to_string());
    }
    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Fixed-table dictionary for tests.
    struct TableDictionary {
        corrections: HashMap<&'static str, Option<&'static str>>,
    }

    impl TableDictionary {
        fn new(entries: &[(&'static str, Option<&'static str>)]) -> Self {
            Self {
                corrections: entries.iter().copied().collect(),
            }
        }
    }

    impl Dictionary for TableDictionary {
        fn is_misspelled(&self, word: &str) -> bool {
            self.corrections.contains_key(word)
        }

        fn suggest(&self, word: &str) -> Option<String> {
            self.corrections
                .get(word)
                .and_then(|s| s.map(str::to_string))
        }
    }

    #[test]
    fn misspelled_tokens_are_replaced() {
        let dict = TableDictionary::new(&[("helo", Some("hello")), ("wrold", Some("world"))]);
        assert_eq!(correct_text(&dict, "helo wrold"), "hello world");
    }

    #[test]
    fn tokens_without_suggestion_are_kept() {
        let dict = TableDictionary::new(&[("zzqq", None)]);
        assert_eq!(correct_text(&dict, "zzqq stays"), "zzqq stays");
    }

    #[test]
    fn capitalized_and_punctuated_tokens_pass_through() {
        let dict = TableDictionary::new(&[("helo", Some("hello"))]);
        // Capitalized: treated as a proper noun
        assert_eq!(correct_text(&dict, "Helo there"), "Helo there");
        // Punctuation attached: left alone
        assert_eq!(correct_text(&dict, "helo, there"), "helo, there");
    }

    #[test]
    fn whitespace_collapses_to_single_spaces() {
        let dict = TableDictionary::new(&[]);
        assert_eq!(correct_text(&dict, "  spaced   out\ttext "), "spaced out text");
    }

    #[test]
    fn empty_dictionary_is_identity() {
        let dict = TableDictionary::new(&[]);
        assert_eq!(correct_text(&dict, "anything at all"), "anything at all");
    }
}
