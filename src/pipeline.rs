//! Per-document outline extraction.
//!
//! [`OutlineExtractor`] drives one document through the classification
//! stages. Extraction never fails: a provider error or an exhausted time
//! budget yields the fallback outline `{title: identifier, outline: []}`,
//! with the reason kept in [`OutlineResult::failure`].

use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::classify::{
    extract_candidates, postprocess, ClassifierConfig, FontSample, KeywordRecognizer,
    LevelAssigner, PatternMatcher, SpanRef, TitleDetector, TypographyScorer,
};
use crate::error::{Error, Result};
use crate::model::{Heading, HeadingLevel, Outline};
use crate::provider::{identifier_for_path, read_all_pages, JsonSpanProvider, SpanProvider};

/// Processing stage of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Loaded,
    SpansObtained,
    TitleResolved,
    CandidatesExtracted,
    SignalsComputed,
    LevelsAssigned,
    Deduplicated,
    Refined,
    Built,
    Failed,
}

/// Options for outline extraction.
#[derive(Debug, Clone)]
pub struct OutlineOptions {
    /// Classifier thresholds, weights, patterns and vocabulary
    pub classifier: ClassifierConfig,

    /// Per-document time budget (None = unlimited)
    pub time_budget: Option<Duration>,

    /// Whether batches run documents in parallel
    pub parallel: bool,
}

impl OutlineOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the classifier configuration.
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set the per-document time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Enable or disable parallel batch processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Process batch documents one at a time.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            time_budget: None,
            parallel: true,
        }
    }
}

/// Statistics collected while extracting an outline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages read from the provider
    pub page_count: u32,

    /// Spans read from the provider
    pub span_count: usize,

    /// Lines considered as headings
    pub candidate_count: usize,

    /// Headings dropped as repeats
    pub duplicates_dropped: usize,

    /// H1 headings in the outline
    pub h1_count: usize,

    /// H2 headings in the outline
    pub h2_count: usize,

    /// H3 headings in the outline
    pub h3_count: usize,

    /// Wall-clock time in milliseconds
    pub elapsed_ms: u64,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total headings in the outline.
    pub fn heading_count(&self) -> usize {
        self.h1_count + self.h2_count + self.h3_count
    }

    /// Count the headings of a finished outline.
    pub fn count_headings(&mut self, headings: &[Heading]) {
        for heading in headings {
            match heading.level {
                HeadingLevel::H1 => self.h1_count += 1,
                HeadingLevel::H2 => self.h2_count += 1,
                HeadingLevel::H3 => self.h3_count += 1,
            }
        }
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.page_count += other.page_count;
        self.span_count += other.span_count;
        self.candidate_count += other.candidate_count;
        self.duplicates_dropped += other.duplicates_dropped;
        self.h1_count += other.h1_count;
        self.h2_count += other.h2_count;
        self.h3_count += other.h3_count;
        self.elapsed_ms += other.elapsed_ms;
    }
}

/// Outcome of extracting one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineResult {
    /// Document identifier reported by the provider
    pub identifier: String,

    /// The outline (fallback outline on failure)
    pub outline: Outline,

    /// Extraction statistics
    pub stats: ExtractionStats,

    /// Last stage reached: `Built` on success, `Failed` otherwise
    pub stage: Stage,

    /// Why extraction failed, if it did
    pub failure: Option<String>,
}

impl OutlineResult {
    /// Result for a document that could not be processed.
    pub fn failed(identifier: impl Into<String>, stats: ExtractionStats, error: &Error) -> Self {
        let identifier = identifier.into();
        Self {
            outline: Outline::fallback(identifier.clone()),
            identifier,
            stats,
            stage: Stage::Failed,
            failure: Some(error.to_string()),
        }
    }

    /// Check if extraction fell back to the identifier-only outline.
    pub fn is_failed(&self) -> bool {
        self.stage == Stage::Failed
    }
}

/// Assembles the final outline from a title and refined headings.
#[derive(Debug, Clone, Default)]
pub struct OutlineBuilder {
    title: String,
    headings: Vec<Heading>,
}

impl OutlineBuilder {
    /// Start an outline with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            headings: Vec::new(),
        }
    }

    /// Append headings, in document order.
    pub fn headings(mut self, headings: impl IntoIterator<Item = Heading>) -> Self {
        self.headings.extend(headings);
        self
    }

    /// Finish the outline.
    pub fn build(self) -> Outline {
        Outline::new(self.title, self.headings)
    }
}

/// Stage tracking with a time budget checked at every transition.
struct Progress {
    stage: Stage,
    started: Instant,
    budget: Option<Duration>,
}

impl Progress {
    fn new(budget: Option<Duration>) -> Self {
        Self {
            stage: Stage::Loaded,
            started: Instant::now(),
            budget,
        }
    }

    fn advance(&mut self, stage: Stage) -> Result<()> {
        if let Some(budget) = self.budget {
            let elapsed = self.started.elapsed();
            if elapsed >= budget {
                return Err(Error::TimeBudgetExceeded {
                    elapsed_ms: elapsed.as_millis() as u64,
                    budget_ms: budget.as_millis() as u64,
                });
            }
        }
        log::trace!("{:?} -> {:?}", self.stage, stage);
        self.stage = stage;
        Ok(())
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// Extracts outlines from span providers.
///
/// Holds the compiled patterns and vocabulary; one extractor can be shared
/// by many threads.
pub struct OutlineExtractor {
    options: OutlineOptions,
    title: TitleDetector,
    patterns: PatternMatcher,
    keywords: KeywordRecognizer,
}

impl OutlineExtractor {
    /// Create an extractor, validating the configuration and compiling patterns.
    pub fn new(options: OutlineOptions) -> Result<Self> {
        options.classifier.validate()?;

        let title = TitleDetector::new(&options.classifier)?;
        let patterns = PatternMatcher::new(&options.classifier.patterns)?;
        let keywords = KeywordRecognizer::new(&options.classifier.keywords);

        Ok(Self {
            options,
            title,
            patterns,
            keywords,
        })
    }

    /// Create an extractor with default options.
    pub fn with_defaults() -> Result<Self> {
        Self::new(OutlineOptions::default())
    }

    /// Get the extraction options.
    pub fn options(&self) -> &OutlineOptions {
        &self.options
    }

    /// Extract the outline of one document.
    pub fn extract<P: SpanProvider + ?Sized>(&self, provider: &P) -> OutlineResult {
        let identifier = provider.identifier().to_string();
        let mut progress = Progress::new(self.options.time_budget);
        let mut stats = ExtractionStats::new();

        match self.run(provider, &mut progress, &mut stats) {
            Ok(outline) => {
                stats.count_headings(&outline.outline);
                stats.elapsed_ms = progress.elapsed_ms();
                log::debug!(
                    "{}: {} headings ({} H1, {} H2, {} H3) in {} ms",
                    identifier,
                    stats.heading_count(),
                    stats.h1_count,
                    stats.h2_count,
                    stats.h3_count,
                    stats.elapsed_ms
                );
                OutlineResult {
                    identifier,
                    outline,
                    stats,
                    stage: Stage::Built,
                    failure: None,
                }
            }
            Err(e) => {
                log::warn!(
                    "Falling back to empty outline for {} (failed after {:?}): {}",
                    identifier,
                    progress.stage,
                    e
                );
                stats.elapsed_ms = progress.elapsed_ms();
                OutlineResult::failed(identifier, stats, &e)
            }
        }
    }

    /// Extract the outline of a JSON span dump.
    ///
    /// A file that cannot be read or parsed yields the fallback outline named
    /// after the file stem.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> OutlineResult {
        let path = path.as_ref();
        match JsonSpanProvider::open(path) {
            Ok(provider) => self.extract(&provider),
            Err(e) => {
                let identifier = identifier_for_path(path);
                log::warn!("Falling back to empty outline for {}: {}", identifier, e);
                OutlineResult::failed(identifier, ExtractionStats::new(), &e)
            }
        }
    }

    fn run<P: SpanProvider + ?Sized>(
        &self,
        provider: &P,
        progress: &mut Progress,
        stats: &mut ExtractionStats,
    ) -> Result<Outline> {
        let config = &self.options.classifier;

        let pages = read_all_pages(provider)?;
        stats.page_count = pages.len() as u32;
        stats.span_count = pages.iter().map(Vec::len).sum();
        progress.advance(Stage::SpansObtained)?;

        let has_text = pages.iter().flatten().any(|s| !s.text.trim().is_empty());
        if !has_text {
            log::debug!("{}: no text spans", provider.identifier());
            progress.advance(Stage::Built)?;
            return Ok(OutlineBuilder::new("").build());
        }

        let selection = self.title.detect(&pages);
        let consumed: HashSet<SpanRef> = selection
            .as_ref()
            .map(|t| t.spans.iter().copied().collect())
            .unwrap_or_default();
        let title = match selection {
            Some(t) => t.text,
            None => provider.identifier().to_string(),
        };
        progress.advance(Stage::TitleResolved)?;

        let mut candidates = extract_candidates(&pages, &consumed, config);
        stats.candidate_count = candidates.len();
        progress.advance(Stage::CandidatesExtracted)?;

        let sample = FontSample::from_pages(&pages, &consumed, config.sample_pages);
        let scorer = TypographyScorer::new(config, &sample);
        for candidate in &mut candidates {
            if candidate.word_count <= config.max_pattern_words {
                candidate.signals.pattern_level =
                    self.patterns.classify(&candidate.text, candidate.standalone);
                candidate.signals.keyword_level = self.keywords.classify(&candidate.text);
            } else {
                log::trace!("Too long for patterns: {:?}", candidate.text);
            }
            scorer.score(candidate);
        }
        progress.advance(Stage::SignalsComputed)?;

        let cuts = sample.cut_points(config.size_tolerance);
        log::debug!(
            "Font sample: {} sizes, body {:?}, cuts h1={:.3} h2={:.3}",
            sample.len(),
            sample.body_size(),
            cuts.h1,
            cuts.h2
        );
        let assigned = LevelAssigner::new(
            cuts,
            config.min_heading_score,
            config.max_typography_per_page,
        )
        .assign(candidates);
        progress.advance(Stage::LevelsAssigned)?;

        let (mut headings, dropped) = postprocess::dedupe(assigned, config.dedupe_across_pages);
        stats.duplicates_dropped = dropped;
        progress.advance(Stage::Deduplicated)?;

        if config.refine_levels {
            postprocess::refine_levels(&mut headings, config.cluster_tolerance);
        }
        progress.advance(Stage::Refined)?;

        let outline = OutlineBuilder::new(title)
            .headings(postprocess::to_headings(headings))
            .build();
        progress.advance(Stage::Built)?;
        Ok(outline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, TextSpan};
    use crate::provider::MemorySpanProvider;

    fn line(text: &str, size: f32, y: f32, id: u64) -> TextSpan {
        TextSpan::new(text, 0, size, false, BBox::new(72.0, y, 500.0, y + size), id)
    }

    #[test]
    fn test_options_builder() {
        let options = OutlineOptions::new()
            .with_time_budget(Duration::from_secs(2))
            .sequential();
        assert_eq!(options.time_budget, Some(Duration::from_secs(2)));
        assert!(!options.parallel);
        assert!(OutlineOptions::default().parallel);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let options =
            OutlineOptions::new().with_classifier(ClassifierConfig::new().with_word_bounds(9, 1));
        assert!(OutlineExtractor::new(options).is_err());
    }

    #[test]
    fn test_builder_keeps_order() {
        let outline = OutlineBuilder::new("Doc")
            .headings(vec![
                Heading::new(HeadingLevel::H2, "B", 1),
                Heading::new(HeadingLevel::H1, "A", 2),
            ])
            .build();
        assert_eq!(outline.title, "Doc");
        assert_eq!(outline.outline[0].text, "B");
    }

    #[test]
    fn test_stage_and_stats() {
        let provider = MemorySpanProvider::new(
            "report",
            vec![vec![
                line("Quarterly Operations Review", 26.0, 60.0, 0),
                line("1. Introduction", 16.0, 140.0, 1),
                line("Body text for the introduction section", 11.0, 170.0, 2),
            ]],
        );
        let result = OutlineExtractor::with_defaults().unwrap().extract(&provider);

        assert_eq!(result.stage, Stage::Built);
        assert!(!result.is_failed());
        assert_eq!(result.outline.title, "Quarterly Operations Review");
        assert_eq!(result.stats.page_count, 1);
        assert_eq!(result.stats.span_count, 3);
        assert_eq!(result.stats.candidate_count, 2);
        assert_eq!(result.stats.heading_count(), result.outline.len());
    }

    #[test]
    fn test_stats_merge() {
        let mut a = ExtractionStats {
            h1_count: 2,
            page_count: 3,
            ..Default::default()
        };
        let b = ExtractionStats {
            h1_count: 1,
            h3_count: 4,
            page_count: 5,
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.h1_count, 3);
        assert_eq!(a.page_count, 8);
        assert_eq!(a.heading_count(), 7);
    }
}
