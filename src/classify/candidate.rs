//! Candidate extraction: merging spans into lines and filtering them.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::model::{BBox, HeadingLevel, LineId, TextSpan};

use super::normalize::{comparison_key, display_text, has_letter, is_all_caps, word_count};
use super::options::ClassifierConfig;

/// Reference to one span: (page, index within that page's span list).
pub type SpanRef = (u32, usize);

/// Independent evidence gathered for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Signals {
    /// Level proposed by a structural pattern
    pub pattern_level: Option<HeadingLevel>,
    /// Level proposed by the section-name vocabulary
    pub keyword_level: Option<HeadingLevel>,
    /// Composite typography score
    pub typography_score: f32,
}

/// Location of a line in reading order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Page index (0-based)
    pub page: u32,
    /// Top edge of the line
    pub y: f32,
    /// Left edge of the line
    pub x: f32,
}

impl Position {
    /// Reading-order comparison: page, then top-to-bottom, then left-to-right.
    pub fn reading_cmp(&self, other: &Position) -> Ordering {
        self.page
            .cmp(&other.page)
            .then_with(|| self.y.total_cmp(&other.y))
            .then_with(|| self.x.total_cmp(&other.x))
    }
}

/// A line-level aggregation of spans considered for heading classification.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingCandidate {
    /// Display text
    pub text: String,
    /// Comparison key (see [`comparison_key`])
    pub normalized: String,
    /// Page index (0-based)
    pub page: u32,
    /// Dominant font size, weighted by character count
    pub font_size: f32,
    /// Predominantly bold
    pub bold: bool,
    /// All letters uppercase
    pub all_caps: bool,
    /// Not a fragment of a longer paragraph
    pub standalone: bool,
    /// Whitespace-separated word count
    pub word_count: usize,
    /// Reading-order position
    pub position: Position,
    /// Index in document order
    pub order: usize,
    /// Font-size percentile within the document sample
    pub percentile: f32,
    /// Classification evidence
    pub signals: Signals,
}

/// Intermediate line built from spans sharing a `line_id`.
#[derive(Debug, Clone)]
struct Line {
    text: String,
    bbox: BBox,
    font_size: f32,
    bold: bool,
}

impl Line {
    fn from_spans(mut spans: Vec<&TextSpan>) -> Self {
        spans.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));

        let raw = spans
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let bbox = spans
            .iter()
            .skip(1)
            .fold(spans[0].bbox, |acc, s| acc.union(&s.bbox));

        // Dominant font size (weighted by text length)
        let total_chars: usize = spans.iter().map(|s| s.text.chars().count()).sum();
        let font_size = if total_chars > 0 {
            spans
                .iter()
                .map(|s| s.font_size * s.text.chars().count() as f32)
                .sum::<f32>()
                / total_chars as f32
        } else {
            spans[0].font_size
        };

        let bold_chars: usize = spans
            .iter()
            .filter(|s| s.bold)
            .map(|s| s.text.chars().count())
            .sum();
        let bold = total_chars > 0 && bold_chars as f32 / total_chars as f32 > 0.5;

        Self {
            text: display_text(&raw),
            bbox,
            font_size,
            bold,
        }
    }

    /// True when `other` reads as the previous or next line of the same paragraph.
    fn continues_paragraph(&self, other: &Line, config: &ClassifierConfig) -> bool {
        if (self.font_size - other.font_size).abs() > config.size_tolerance {
            return false;
        }

        let overlaps_horizontally = other.bbox.x0 < self.bbox.x1 && self.bbox.x0 < other.bbox.x1;
        if !overlaps_horizontally {
            return false;
        }

        let gap = if other.bbox.y0 >= self.bbox.y0 {
            other.bbox.y0 - self.bbox.y1
        } else {
            self.bbox.y0 - other.bbox.y1
        };
        gap < config.paragraph_gap_ratio * self.font_size
    }
}

/// Group one page's spans into lines, in reading order.
fn page_lines(page: u32, spans: &[TextSpan], consumed: &HashSet<SpanRef>) -> Vec<Line> {
    let mut groups: Vec<Vec<&TextSpan>> = Vec::new();
    let mut index: HashMap<LineId, usize> = HashMap::new();

    for (i, span) in spans.iter().enumerate() {
        if consumed.contains(&(page, i)) || !span.is_well_formed() || span.text.trim().is_empty() {
            continue;
        }
        let slot = *index.entry(span.line_id).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(span);
    }

    let mut lines: Vec<Line> = groups.into_iter().map(Line::from_spans).collect();
    lines.sort_by(|a, b| {
        a.bbox
            .y0
            .total_cmp(&b.bbox.y0)
            .then_with(|| a.bbox.x0.total_cmp(&b.bbox.x0))
    });
    lines
}

/// Extract heading candidates from every page.
///
/// Spans listed in `consumed` (the title) are skipped. Lines without letters
/// or longer than `max_line_chars` are dropped. Candidates come back in
/// document order with `order` set; percentile and signals are filled in by
/// the scorers.
pub fn extract_candidates(
    pages: &[Vec<TextSpan>],
    consumed: &HashSet<SpanRef>,
    config: &ClassifierConfig,
) -> Vec<HeadingCandidate> {
    let mut candidates = Vec::new();

    for (page_idx, spans) in pages.iter().enumerate() {
        let page = page_idx as u32;
        let lines = page_lines(page, spans, consumed);

        for (i, line) in lines.iter().enumerate() {
            if line.text.is_empty() || !has_letter(&line.text) {
                continue;
            }
            if line.text.chars().count() > config.max_line_chars {
                log::trace!("Dropping over-long line on page {}", page);
                continue;
            }

            let standalone = !lines
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && line.continues_paragraph(other, config));

            candidates.push(HeadingCandidate {
                normalized: comparison_key(&line.text),
                word_count: word_count(&line.text),
                all_caps: is_all_caps(&line.text),
                text: line.text.clone(),
                page,
                font_size: line.font_size,
                bold: line.bold,
                standalone,
                position: Position {
                    page,
                    y: line.bbox.y0,
                    x: line.bbox.x0,
                },
                order: candidates.len(),
                percentile: 0.0,
                signals: Signals::default(),
            });
        }
    }

    log::debug!("Extracted {} heading candidates", candidates.len());
    candidates
}
