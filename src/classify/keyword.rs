//! Section-name vocabulary.

use std::collections::{BTreeMap, HashMap};

use crate::model::HeadingLevel;

use super::normalize::keyword_key;

/// Classifies whole lines against a fixed vocabulary of section names.
///
/// Matching is on the folded line text (see [`keyword_key`]), never on
/// substrings, so prose mentioning "results" does not match.
#[derive(Debug, Clone, Default)]
pub struct KeywordRecognizer {
    vocabulary: HashMap<String, HeadingLevel>,
}

impl KeywordRecognizer {
    /// Build a recognizer from keyword → level entries.
    pub fn new(keywords: &BTreeMap<String, HeadingLevel>) -> Self {
        let vocabulary = keywords
            .iter()
            .map(|(k, level)| (keyword_key(k), *level))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        Self { vocabulary }
    }

    /// Level suggested for the line, or `None`.
    pub fn classify(&self, text: &str) -> Option<HeadingLevel> {
        let key = keyword_key(text);
        if key.is_empty() {
            return None;
        }
        self.vocabulary.get(&key).copied()
    }

    /// Number of vocabulary entries.
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Check if the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }
}
