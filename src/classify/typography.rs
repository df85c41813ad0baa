//! Font-size statistics and the typography score.

use std::collections::{BTreeMap, HashSet};

use crate::model::TextSpan;

use super::candidate::{HeadingCandidate, SpanRef};
use super::normalize::ends_like_sentence;
use super::options::ClassifierConfig;

/// Round a font size to 0.1pt precision.
fn quantize(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

/// Font-size distribution sampled from the first pages of a document.
///
/// Computed once per document and passed by reference to the scorer and
/// the level assigner.
#[derive(Debug, Clone, Default)]
pub struct FontSample {
    /// Quantized sizes, ascending
    sizes: Vec<i32>,
    /// Quantized size -> occurrences
    histogram: BTreeMap<i32, usize>,
}

impl FontSample {
    /// Sample every span on the first `sample_pages` pages, skipping spans
    /// in `excluded` (the title) and malformed spans.
    pub fn from_pages(
        pages: &[Vec<TextSpan>],
        excluded: &HashSet<SpanRef>,
        sample_pages: u32,
    ) -> Self {
        let sizes = pages
            .iter()
            .take(sample_pages as usize)
            .enumerate()
            .flat_map(|(p, spans)| {
                spans
                    .iter()
                    .enumerate()
                    .filter(move |(i, _)| !excluded.contains(&(p as u32, *i)))
                    .map(|(_, s)| s)
            })
            .filter(|s| s.is_well_formed() && !s.text.trim().is_empty())
            .map(|s| s.font_size);
        Self::from_sizes(sizes)
    }

    /// Build a sample from raw font sizes.
    pub fn from_sizes<I: IntoIterator<Item = f32>>(sizes: I) -> Self {
        let mut sample = Self::default();
        for size in sizes.into_iter().filter(|s| s.is_finite() && *s > 0.0) {
            let key = quantize(size);
            sample.sizes.push(key);
            *sample.histogram.entry(key).or_insert(0) += 1;
        }
        sample.sizes.sort_unstable();
        sample
    }

    /// Number of sampled sizes.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Check if nothing was sampled.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Mid-rank percentile of `size`: `(below + equal / 2) / n`.
    ///
    /// An empty sample places every size at 0.5.
    pub fn percentile(&self, size: f32) -> f32 {
        if self.sizes.is_empty() {
            return 0.5;
        }
        let key = quantize(size);
        let below = self.sizes.partition_point(|s| *s < key);
        let not_above = self.sizes.partition_point(|s| *s <= key);
        let equal = not_above - below;
        (below as f32 + equal as f32 / 2.0) / self.sizes.len() as f32
    }

    /// Most frequent size; ties go to the smaller size.
    pub fn body_size(&self) -> Option<f32> {
        self.body().map(|(size, _)| size)
    }

    /// Body size together with how many samples have it.
    pub fn body(&self) -> Option<(f32, usize)> {
        let mut best: Option<(i32, usize)> = None;
        for (&key, &count) in &self.histogram {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((key, count));
            }
        }
        best.map(|(key, count)| (key as f32 / 10.0, count))
    }

    /// Distinct sizes more than `tolerance` above the body size, largest first.
    pub fn heading_sizes(&self, tolerance: f32) -> Vec<f32> {
        let Some(body) = self.body_size() else {
            return Vec::new();
        };
        self.histogram
            .keys()
            .rev()
            .map(|k| *k as f32 / 10.0)
            .filter(|size| *size > body + tolerance)
            .collect()
    }

    /// Percentile thresholds separating H1, H2 and H3 typography headings.
    pub fn cut_points(&self, tolerance: f32) -> CutPoints {
        let heading_sizes = self.heading_sizes(tolerance);
        match heading_sizes.as_slice() {
            [] => CutPoints::none(),
            [only] => {
                let p = self.percentile(*only);
                CutPoints { h1: p, h2: p }
            }
            [first, second, ..] => CutPoints {
                h1: self.percentile(*first),
                h2: self.percentile(*second),
            },
        }
    }
}

/// Percentile thresholds: `>= h1` is H1, `>= h2` is H2, anything else H3.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutPoints {
    pub h1: f32,
    pub h2: f32,
}

impl CutPoints {
    /// Cut-points no percentile reaches; typography alone yields H3 only.
    pub fn none() -> Self {
        Self {
            h1: f32::INFINITY,
            h2: f32::INFINITY,
        }
    }
}

/// Computes the composite typography score of candidates.
pub struct TypographyScorer<'a> {
    config: &'a ClassifierConfig,
    sample: &'a FontSample,
}

impl<'a> TypographyScorer<'a> {
    /// Create a scorer over a document's font sample.
    pub fn new(config: &'a ClassifierConfig, sample: &'a FontSample) -> Self {
        Self { config, sample }
    }

    /// Fill in the candidate's percentile and typography score.
    pub fn score(&self, candidate: &mut HeadingCandidate) {
        let percentile = self.sample.percentile(candidate.font_size);
        candidate.percentile = percentile;
        candidate.signals.typography_score = self.composite(candidate, percentile);
    }

    /// Plain text at the body size: neither bold nor all-caps.
    ///
    /// Only meaningful when the body size repeats; a sample where every
    /// size occurs once has no body text to compare against.
    fn is_body_text(&self, candidate: &HeadingCandidate) -> bool {
        match self.sample.body() {
            Some((body, count)) if count > 1 => {
                !candidate.bold
                    && !candidate.all_caps
                    && (candidate.font_size - body).abs() <= self.config.size_tolerance
            }
            _ => false,
        }
    }

    fn composite(&self, candidate: &HeadingCandidate, percentile: f32) -> f32 {
        if self.is_body_text(candidate) {
            return 0.0;
        }

        let w = &self.config.weights;
        let flag = |b: bool| -> f32 { if b { 1.0 } else { 0.0 } };

        let mut score = w.percentile * percentile
            + w.standalone * flag(candidate.standalone)
            + w.bold * flag(candidate.bold)
            + w.all_caps * flag(candidate.all_caps);

        if candidate.word_count < self.config.min_words
            || candidate.word_count > self.config.max_words
        {
            score *= self.config.word_count_penalty;
        }
        if ends_like_sentence(&candidate.text) {
            score *= self.config.sentence_penalty;
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::candidate::{Position, Signals};

    fn candidate(text: &str, size: f32, bold: bool, standalone: bool) -> HeadingCandidate {
        HeadingCandidate {
            text: text.to_string(),
            normalized: text.to_lowercase(),
            page: 0,
            font_size: size,
            bold,
            all_caps: false,
            standalone,
            word_count: text.split_whitespace().count(),
            position: Position { page: 0, y: 0.0, x: 0.0 },
            order: 0,
            percentile: 0.0,
            signals: Signals::default(),
        }
    }

    #[test]
    fn test_percentile_mid_rank() {
        let sample = FontSample::from_sizes([10.0, 10.0, 12.0, 18.0]);
        assert_eq!(sample.percentile(10.0), 0.25);
        assert_eq!(sample.percentile(12.0), 0.625);
        assert_eq!(sample.percentile(18.0), 0.875);
        assert_eq!(sample.percentile(30.0), 1.0);
        assert_eq!(sample.percentile(8.0), 0.0);
        assert_eq!(FontSample::default().percentile(14.0), 0.5);
    }

    #[test]
    fn test_body_and_heading_sizes() {
        let sample = FontSample::from_sizes([11.0, 11.0, 11.0, 11.2, 14.0, 18.0, 18.0, 9.0]);
        assert_eq!(sample.body_size(), Some(11.0));
        assert_eq!(sample.heading_sizes(0.5), vec![18.0, 14.0]);

        // Ties for the mode go to the smaller size
        let tied = FontSample::from_sizes([12.0, 12.0, 10.0, 10.0]);
        assert_eq!(tied.body_size(), Some(10.0));
        assert_eq!(FontSample::default().body_size(), None);
    }

    #[test]
    fn test_cut_points() {
        let sample = FontSample::from_sizes([24.0, 18.0, 12.0, 12.0, 12.0]);
        let cuts = sample.cut_points(0.5);
        assert_eq!(cuts.h1, sample.percentile(24.0));
        assert_eq!(cuts.h2, sample.percentile(18.0));
        assert!(cuts.h1 > cuts.h2);

        let flat = FontSample::from_sizes([11.0, 11.0, 11.3]);
        assert_eq!(flat.cut_points(0.5), CutPoints::none());

        let single = FontSample::from_sizes([11.0, 11.0, 16.0]);
        let cuts = single.cut_points(0.5);
        assert_eq!(cuts.h1, cuts.h2);
    }

    #[test]
    fn test_sample_limits_pages_and_skips_excluded() {
        use crate::model::BBox;
        let span = |size: f32| TextSpan::new("text", 0, size, false, BBox::new(0.0, 0.0, 10.0, 10.0), 0);
        let pages: Vec<Vec<TextSpan>> = (0..7).map(|p| vec![span(10.0 + p as f32)]).collect();

        let sample = FontSample::from_pages(&pages, &HashSet::new(), 5);
        assert_eq!(sample.len(), 5);

        let excluded: HashSet<SpanRef> = [(0, 0)].into_iter().collect();
        let sample = FontSample::from_pages(&pages, &excluded, 5);
        assert_eq!(sample.len(), 4);
        assert_eq!(sample.percentile(10.0), 0.0);
    }

    #[test]
    fn test_score_ordering() {
        let config = ClassifierConfig::default();
        let sample = FontSample::from_sizes([24.0, 18.0, 12.0, 12.0, 12.0]);
        let scorer = TypographyScorer::new(&config, &sample);

        let mut big = candidate("Market Overview", 24.0, true, true);
        let mut mid = candidate("Regional Detail", 18.0, false, true);
        let mut body = candidate("continued from the previous", 12.0, false, false);
        for c in [&mut big, &mut mid, &mut body] {
            scorer.score(c);
        }

        assert!(big.signals.typography_score > mid.signals.typography_score);
        assert!(mid.signals.typography_score > body.signals.typography_score);
        assert!(body.signals.typography_score < config.min_heading_score);
        assert_eq!(big.percentile, sample.percentile(24.0));
    }

    #[test]
    fn test_body_text_scores_zero() {
        let config = ClassifierConfig::default();
        let sample = FontSample::from_sizes([11.0, 11.0, 11.0, 11.2, 16.0]);
        let scorer = TypographyScorer::new(&config, &sample);

        let mut plain = candidate("Meeting adjourned at noon", 11.0, false, true);
        let mut bold = candidate("Action Items", 11.0, true, true);
        let mut larger = candidate("Next Steps", 16.0, false, true);
        for c in [&mut plain, &mut bold, &mut larger] {
            scorer.score(c);
        }

        assert_eq!(plain.signals.typography_score, 0.0);
        assert!(bold.signals.typography_score >= config.min_heading_score);
        assert!(larger.signals.typography_score >= config.min_heading_score);

        // Without a repeated body size nothing counts as body text
        let spread = FontSample::from_sizes([24.0, 18.0, 11.0]);
        let scorer = TypographyScorer::new(&config, &spread);
        let mut plain = candidate("Quality Control Checks", 11.0, false, true);
        scorer.score(&mut plain);
        assert!(plain.signals.typography_score > 0.0);
    }

    #[test]
    fn test_penalties() {
        let config = ClassifierConfig::default();
        let sample = FontSample::from_sizes([18.0, 12.0]);
        let scorer = TypographyScorer::new(&config, &sample);

        let mut single_word = candidate("Overview", 18.0, true, true);
        let mut two_words = candidate("Market Overview", 18.0, true, true);
        let mut sentence = candidate("Market Overview.", 18.0, true, true);
        for c in [&mut single_word, &mut two_words, &mut sentence] {
            scorer.score(c);
        }

        let full = two_words.signals.typography_score;
        assert!((single_word.signals.typography_score - full * 0.05).abs() < 1e-6);
        assert!((sentence.signals.typography_score - full * 0.5).abs() < 1e-6);
    }
}
