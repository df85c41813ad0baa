//! Classifier configuration.
//!
//! Every threshold and weight used by the heuristics lives here with a
//! documented default. The struct deserializes with `#[serde(default)]`, so a
//! JSON file may override any subset of fields.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::HeadingLevel;

/// Tunable parameters for title detection and heading classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Pages scanned for the title
    pub title_pages: u32,

    /// Minimum title length in characters
    pub title_min_chars: usize,

    /// Maximum title length in characters
    pub title_max_chars: usize,

    /// Lines longer than this (characters) never become candidates
    pub max_line_chars: usize,

    /// Lines with more words than this never match patterns or keywords
    pub max_pattern_words: usize,

    /// Font sizes closer than this (points) count as the same size
    pub size_tolerance: f32,

    /// Vertical gap below which a same-size neighbor line joins a paragraph,
    /// as a fraction of the font size
    pub paragraph_gap_ratio: f32,

    /// Pages sampled for the font-size distribution
    pub sample_pages: u32,

    /// Typography feature weights
    pub weights: TypographyWeights,

    /// Minimum word count for a typography-only heading
    pub min_words: usize,

    /// Maximum word count for a typography-only heading
    pub max_words: usize,

    /// Score multiplier for word counts outside `[min_words, max_words]`
    pub word_count_penalty: f32,

    /// Score multiplier for lines ending in sentence punctuation
    pub sentence_penalty: f32,

    /// Typography scores below this are not headings
    pub min_heading_score: f32,

    /// Cap on typography-only headings per page (0 = unlimited)
    pub max_typography_per_page: usize,

    /// Structural patterns per level
    pub patterns: PatternSet,

    /// Section-name vocabulary and suggested levels
    pub keywords: BTreeMap<String, HeadingLevel>,

    /// Drop repeats of the same text and level on later pages
    pub dedupe_across_pages: bool,

    /// Remap levels onto observed font-size clusters
    pub refine_levels: bool,

    /// Sizes within this distance (points) of a cluster's largest size join it
    pub cluster_tolerance: f32,
}

impl ClassifierConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file; missing fields keep defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json_slice(&data)
    }

    /// Load a configuration from JSON bytes; missing fields keep defaults.
    pub fn from_json_slice(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the typography weights.
    pub fn with_weights(mut self, weights: TypographyWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the word-count bounds for typography-only headings.
    pub fn with_word_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_words = min;
        self.max_words = max;
        self
    }

    /// Set the word limit for pattern and keyword matches.
    pub fn with_max_pattern_words(mut self, words: usize) -> Self {
        self.max_pattern_words = words;
        self
    }

    /// Set the minimum typography score.
    pub fn with_min_score(mut self, score: f32) -> Self {
        self.min_heading_score = score;
        self
    }

    /// Enable or disable cross-page deduplication.
    pub fn with_cross_page_dedupe(mut self, enabled: bool) -> Self {
        self.dedupe_across_pages = enabled;
        self
    }

    /// Enable or disable font-size level refinement.
    pub fn with_refinement(mut self, enabled: bool) -> Self {
        self.refine_levels = enabled;
        self
    }

    /// Add or replace a vocabulary entry.
    pub fn with_keyword(mut self, keyword: impl Into<String>, level: HeadingLevel) -> Self {
        self.keywords.insert(keyword.into(), level);
        self
    }

    /// Check that values are mutually consistent.
    pub fn validate(&self) -> Result<()> {
        if self.title_min_chars > self.title_max_chars {
            return Err(Error::InvalidConfig(format!(
                "title_min_chars ({}) exceeds title_max_chars ({})",
                self.title_min_chars, self.title_max_chars
            )));
        }
        if self.min_words > self.max_words {
            return Err(Error::InvalidConfig(format!(
                "min_words ({}) exceeds max_words ({})",
                self.min_words, self.max_words
            )));
        }
        self.weights.validate()?;
        for (name, v) in [
            ("size_tolerance", self.size_tolerance),
            ("paragraph_gap_ratio", self.paragraph_gap_ratio),
            ("word_count_penalty", self.word_count_penalty),
            ("sentence_penalty", self.sentence_penalty),
            ("min_heading_score", self.min_heading_score),
            ("cluster_tolerance", self.cluster_tolerance),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, v
                )));
            }
        }
        Ok(())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            title_pages: 3,
            title_min_chars: 4,
            title_max_chars: 150,
            max_line_chars: 150,
            max_pattern_words: 20,
            size_tolerance: 0.5,
            paragraph_gap_ratio: 0.5,
            sample_pages: 5,
            weights: TypographyWeights::default(),
            min_words: 2,
            max_words: 25,
            word_count_penalty: 0.05,
            sentence_penalty: 0.5,
            min_heading_score: 0.35,
            max_typography_per_page: 12,
            patterns: PatternSet::default(),
            keywords: default_keywords(),
            dedupe_across_pages: true,
            refine_levels: true,
            cluster_tolerance: 0.5,
        }
    }
}

/// Weights of the typography features in the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypographyWeights {
    /// Font-size percentile within the sample
    pub percentile: f32,
    /// Standalone line (not part of a paragraph)
    pub standalone: f32,
    /// Bold font
    pub bold: f32,
    /// All-caps text
    pub all_caps: f32,
}

impl TypographyWeights {
    /// Highest score the weights can produce.
    pub fn total(&self) -> f32 {
        self.percentile + self.standalone + self.bold + self.all_caps
    }

    fn validate(&self) -> Result<()> {
        let all = [self.percentile, self.standalone, self.bold, self.all_caps];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::InvalidConfig(
                "typography weights must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TypographyWeights {
    fn default() -> Self {
        Self {
            percentile: 0.4,
            standalone: 0.3,
            bold: 0.2,
            all_caps: 0.1,
        }
    }
}

/// Structural heading patterns, tested H1 first, then H2, then H3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSet {
    /// Top-level patterns
    pub h1: Vec<String>,
    /// Top-level patterns that only apply to standalone lines
    pub h1_standalone: Vec<String>,
    /// Second-level patterns
    pub h2: Vec<String>,
    /// Third-level patterns
    pub h3: Vec<String>,
}

impl Default for PatternSet {
    fn default() -> Self {
        Self {
            h1: vec![
                // 1. Introduction
                r"^\d+\.(?:\s+\S.*)?$".to_string(),
                // Chapter 3, Chapter IV
                r"(?i)^chapter\s+(?:\d+|[ivxlcdm]+)\b".to_string(),
                // IV. Findings
                r"^[IVXLCDM]+\.(?:\s+\S.*)?$".to_string(),
                // Appendix A
                r"^Appendix\s+(?:[A-Z]|\d+)\b".to_string(),
            ],
            h1_standalone: vec![
                // SHORT ALL-CAPS LINE
                r"^\p{Lu}{2}[\p{Lu}\d\s&,:'’/\-]{2,58}$".to_string(),
            ],
            h2: vec![
                // 2.1 Scope
                r"^\d+\.\d+\.?(?:\s+\S.*)?$".to_string(),
                // a) Goals, (b) Constraints
                r"^\(?[a-z]\)(?:\s+\S.*)?$".to_string(),
            ],
            h3: vec![
                // 2.1.4 Data retention
                r"^\d+\.\d+\.\d+\.?(?:\s+\S.*)?$".to_string(),
                // (3) Exceptions
                r"^\(\d+\)(?:\s+\S.*)?$".to_string(),
            ],
        }
    }
}

fn default_keywords() -> BTreeMap<String, HeadingLevel> {
    use HeadingLevel::{H1, H2, H3};

    let entries: [(&str, HeadingLevel); 37] = [
        ("abstract", H1),
        ("acknowledgements", H1),
        ("acknowledgments", H1),
        ("bibliography", H1),
        ("conclusion", H1),
        ("conclusions", H1),
        ("contents", H1),
        ("executive summary", H1),
        ("foreword", H1),
        ("glossary", H1),
        ("introduction", H1),
        ("overview", H1),
        ("preface", H1),
        ("references", H1),
        ("summary", H1),
        ("table of contents", H1),
        ("appendix", H2),
        ("approach", H2),
        ("background", H2),
        ("discussion", H2),
        ("evaluation", H2),
        ("future work", H2),
        ("implementation", H2),
        ("limitations", H2),
        ("methodology", H2),
        ("methods", H2),
        ("objectives", H2),
        ("related work", H2),
        ("results", H2),
        ("scope", H2),
        ("assumptions", H3),
        ("definitions", H3),
        ("example", H3),
        ("examples", H3),
        ("notes", H3),
        ("remarks", H3),
        ("timeline", H3),
    ];

    entries
        .into_iter()
        .map(|(k, level)| (k.to_string(), level))
        .collect()
}
