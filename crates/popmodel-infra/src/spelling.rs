//! Embedded word-list dictionary with similarity-ranked suggestions.
//!
//! Backs the `Dictionary` trait with a bundled list of common English
//! words. A token absent from the list is flagged as misspelled; the
//! suggestion is the closest list entry by Jaro-Winkler similarity, and
//! only when the similarity clears a high threshold. Below the threshold
//! no suggestion is made and the token passes through unchanged.

use std::collections::HashSet;

use popmodel_core::spelling::Dictionary;
use strsim::jaro_winkler;

/// Bundled word list, one lowercase word per line.
const WORDLIST: &str = include_str!("../assets/wordlist.txt");

/// Minimum similarity for a suggestion to be offered.
const SUGGESTION_THRESHOLD: f64 = 0.88;

pub struct WordListDictionary {
    words: Vec<&'static str>,
    index: HashSet<&'static str>,
}

impl WordListDictionary {
    /// Load the bundled word list.
    pub fn bundled() -> Self {
        Self::from_lines(WORDLIST)
    }

    fn from_lines(lines: &'static str) -> Self {
        let words: Vec<&'static str> = lines
            .lines()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .collect();
        let index = words.iter().copied().collect();
        Self { words, index }
    }
}

impl Dictionary for WordListDictionary {
    fn is_misspelled(&self, word: &str) -> bool {
        // An empty list degrades to identity, never to "everything is wrong".
        !self.words.is_empty() && !self.index.contains(word)
    }

    fn suggest(&self, word: &str) -> Option<String> {
        let mut best: Option<(&str, f64)> = None;
        for candidate in &self.words {
            let score = jaro_winkler(word, candidate);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((candidate, score));
            }
        }
        best.filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .map(|(candidate, _)| candidate.to_string())
    }
}
