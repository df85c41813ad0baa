//! Structural heading patterns (numbering, chapter markers, all-caps lines).

use regex::Regex;

use crate::error::Result;
use crate::model::HeadingLevel;

use super::options::PatternSet;

/// Classifies a line by ordered structural patterns.
///
/// H1 patterns are tried first, then H2, then H3; the first match fixes the
/// level. Precedence never depends on scores. Standalone-only H1 patterns
/// are skipped for lines that belong to a paragraph.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    levels: Vec<(HeadingLevel, Vec<Regex>)>,
    standalone_h1: Vec<Regex>,
}

impl PatternMatcher {
    /// Compile a pattern set.
    pub fn new(patterns: &PatternSet) -> Result<Self> {
        let compile = |sources: &[String]| -> Result<Vec<Regex>> {
            sources.iter().map(|s| Ok(Regex::new(s)?)).collect()
        };

        Ok(Self {
            levels: vec![
                (HeadingLevel::H1, compile(&patterns.h1)?),
                (HeadingLevel::H2, compile(&patterns.h2)?),
                (HeadingLevel::H3, compile(&patterns.h3)?),
            ],
            standalone_h1: compile(&patterns.h1_standalone)?,
        })
    }

    /// Level of the first matching pattern, or `None`.
    pub fn classify(&self, text: &str, standalone: bool) -> Option<HeadingLevel> {
        let text = text.trim();
        self.levels
            .iter()
            .find(|(level, regexes)| {
                regexes.iter().any(|re| re.is_match(text))
                    || (*level == HeadingLevel::H1
                        && standalone
                        && self.standalone_h1.iter().any(|re| re.is_match(text)))
            })
            .map(|(level, _)| *level)
    }

    /// Total number of compiled patterns.
    pub fn len(&self) -> usize {
        self.levels.iter().map(|(_, r)| r.len()).sum::<usize>() + self.standalone_h1.len()
    }

    /// Check if no patterns are configured.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use HeadingLevel::{H1, H2, H3};

    fn matcher() -> PatternMatcher {
        PatternMatcher::new(&PatternSet::default()).unwrap()
    }

    #[test]
    fn test_h1_patterns() {
        let m = matcher();
        assert_eq!(m.classify("1. Introduction", true), Some(H1));
        assert_eq!(m.classify("12.", true), Some(H1));
        assert_eq!(m.classify("Chapter 3", true), Some(H1));
        assert_eq!(m.classify("CHAPTER IV The Return", true), Some(H1));
        assert_eq!(m.classify("IV. Findings", true), Some(H1));
        assert_eq!(m.classify("Appendix B: Glossary", true), Some(H1));
        assert_eq!(m.classify("PROJECT BACKGROUND", true), Some(H1));
    }

    #[test]
    fn test_h2_patterns() {
        let m = matcher();
        assert_eq!(m.classify("2.1 Scope", true), Some(H2));
        assert_eq!(m.classify("2.1. Scope", true), Some(H2));
        assert_eq!(m.classify("a) Goals", true), Some(H2));
        assert_eq!(m.classify("(b) Constraints", true), Some(H2));
    }

    #[test]
    fn test_h3_patterns() {
        let m = matcher();
        assert_eq!(m.classify("2.1.4 Data retention", true), Some(H3));
        assert_eq!(m.classify("(3) Exceptions", true), Some(H3));
    }

    #[test]
    fn test_no_match() {
        let m = matcher();
        assert_eq!(m.classify("Results were mixed across regions", true), None);
        assert_eq!(m.classify("Appendix and notes", true), None);
        assert_eq!(m.classify("Q3", true), None);
    }

    #[test]
    fn test_all_caps_needs_standalone_line() {
        let m = matcher();
        assert_eq!(m.classify("LIMITATION OF LIABILITY", true), Some(H1));
        assert_eq!(m.classify("LIMITATION OF LIABILITY", false), None);
        // Numbering does not depend on layout
        assert_eq!(m.classify("1. Introduction", false), Some(H1));
        assert_eq!(m.classify("2.1 Scope", false), Some(H2));
    }

    #[test]
    fn test_first_level_wins() {
        let patterns = PatternSet {
            h1: vec![r"^Part\b".to_string()],
            h1_standalone: vec![],
            h2: vec![r"^Part\b".to_string()],
            h3: vec![],
        };
        let m = PatternMatcher::new(&patterns).unwrap();
        assert_eq!(m.classify("Part One", true), Some(H1));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_invalid_pattern() {
        let patterns = PatternSet {
            h1: vec!["(".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            PatternMatcher::new(&patterns),
            Err(Error::InvalidPattern(_))
        ));
    }
}
