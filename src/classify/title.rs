//! Title detection over the first pages of a document.

use std::cmp::Ordering;

use regex::Regex;

use crate::error::Result;
use crate::model::{LineId, TextSpan};

use super::candidate::SpanRef;
use super::normalize::{collapse_whitespace, display_text, is_all_lowercase};
use super::options::ClassifierConfig;

/// Maximum number of same-size lines merged below the first title line.
const MAX_TITLE_CONTINUATION_LINES: usize = 2;

/// Selected title and the spans it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleSelection {
    /// Title text
    pub text: String,
    /// Spans making up the title; excluded from heading candidates
    pub spans: Vec<SpanRef>,
}

/// Picks the document title from the largest text on the first pages.
pub struct TitleDetector {
    page_number_regex: Regex,
    boilerplate_regex: Regex,
    pages: u32,
    min_chars: usize,
    max_chars: usize,
    size_tolerance: f32,
}

impl TitleDetector {
    /// Create a detector from the classifier configuration.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            page_number_regex: Regex::new(
                r"(?i)^(?:(?:page\s*)?[-–—]?\s*\d+\s*[-–—]?(?:\s*(?:of|/)\s*\d+)?|[ivxlcdm]+)$",
            )?,
            boilerplate_regex: Regex::new(
                r"(?i)(?:©|\(c\)|\bcopyright\b|all rights reserved|\bconfidential\b|https?://|www\.)",
            )?,
            pages: config.title_pages,
            min_chars: config.title_min_chars,
            max_chars: config.title_max_chars,
            size_tolerance: config.size_tolerance,
        })
    }

    /// Whether a span's text may serve as a title.
    pub fn is_eligible(&self, text: &str) -> bool {
        let text = collapse_whitespace(text);
        let chars = text.chars().count();

        if chars < self.min_chars || chars > self.max_chars {
            return false;
        }
        if self.page_number_regex.is_match(&text) || self.boilerplate_regex.is_match(&text) {
            return false;
        }
        !is_all_lowercase(&text)
    }

    /// Select the title, or `None` when no span on the first pages qualifies.
    ///
    /// Ranking is by font size (largest first), then page, then vertical
    /// position (topmost first). Spans sharing the winner's line and size are
    /// joined, as are up to two same-size lines directly below it.
    pub fn detect(&self, pages: &[Vec<TextSpan>]) -> Option<TitleSelection> {
        let scan = (self.pages as usize).min(pages.len());

        let winner = pages[..scan]
            .iter()
            .enumerate()
            .flat_map(|(p, spans)| spans.iter().enumerate().map(move |(i, s)| ((p as u32, i), s)))
            .filter(|(_, s)| s.is_well_formed() && self.is_eligible(&s.text))
            .min_by(|(ra, a), (rb, b)| rank(a, b).then_with(|| ra.cmp(rb)))?;

        let ((page, _), span) = winner;
        let spans = &pages[page as usize];

        let mut refs = self.same_size_line(page, spans, span.line_id, span.font_size);
        let mut bottom = line_bottom(spans, &refs);

        // Follow the title onto the lines directly below it
        let mut next_lines: Vec<(LineId, f32)> = spans
            .iter()
            .filter(|s| s.is_well_formed() && s.bbox.y0 > span.bbox.y0 && s.line_id != span.line_id)
            .map(|s| (s.line_id, s.bbox.y0))
            .collect();
        next_lines.sort_by(|a, b| a.1.total_cmp(&b.1));
        next_lines.dedup_by_key(|(id, _)| *id);

        for (line_id, y0) in next_lines.into_iter().take(MAX_TITLE_CONTINUATION_LINES) {
            let gap = y0 - bottom;
            let line_refs = self.same_size_line(page, spans, line_id, span.font_size);
            let whole_line = spans.iter().filter(|s| s.line_id == line_id).count();
            if gap > span.font_size || line_refs.is_empty() || line_refs.len() != whole_line {
                break;
            }
            bottom = line_bottom(spans, &line_refs);
            refs.extend(line_refs);
        }

        let text = display_text(
            &refs
                .iter()
                .map(|(_, i)| spans[*i].text.trim())
                .collect::<Vec<_>>()
                .join(" "),
        );

        log::debug!("Title selected on page {}: {:?}", page, text);
        Some(TitleSelection { text, spans: refs })
    }

    /// Spans on `line_id` whose size matches `font_size`, in left-to-right order.
    fn same_size_line(
        &self,
        page: u32,
        spans: &[TextSpan],
        line_id: LineId,
        font_size: f32,
    ) -> Vec<SpanRef> {
        let mut members: Vec<usize> = spans
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                s.line_id == line_id
                    && s.is_well_formed()
                    && (s.font_size - font_size).abs() <= self.size_tolerance
            })
            .map(|(i, _)| i)
            .collect();
        members.sort_by(|a, b| spans[*a].bbox.x0.total_cmp(&spans[*b].bbox.x0));
        members.into_iter().map(|i| (page, i)).collect()
    }
}

/// Title ranking: larger font, earlier page, higher on the page.
fn rank(a: &TextSpan, b: &TextSpan) -> Ordering {
    b.font_size
        .total_cmp(&a.font_size)
        .then_with(|| a.page.cmp(&b.page))
        .then_with(|| a.bbox.y0.total_cmp(&b.bbox.y0))
}

fn line_bottom(spans: &[TextSpan], refs: &[SpanRef]) -> f32 {
    refs.iter()
        .map(|(_, i)| spans[*i].bbox.y1)
        .fold(f32::MIN, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    fn span(text: &str, page: u32, size: f32, y: f32, line: u64) -> TextSpan {
        TextSpan::new(text, page, size, false, BBox::new(72.0, y, 400.0, y + size), line)
    }

    fn detector() -> TitleDetector {
        TitleDetector::new(&ClassifierConfig::default()).unwrap()
    }

    #[test]
    fn test_largest_span_wins() {
        let pages = vec![vec![
            span("Prepared for the board", 0, 12.0, 300.0, 2),
            span("Foundation Level Extensions", 0, 26.0, 120.0, 1),
            span("Version 2.1", 0, 14.0, 200.0, 3),
        ]];
        let title = detector().detect(&pages).unwrap();
        assert_eq!(title.text, "Foundation Level Extensions");
        assert_eq!(title.spans, vec![(0, 1)]);
    }

    #[test]
    fn test_ties_prefer_earlier_page_then_top() {
        let pages = vec![
            vec![span("Lower Heading", 0, 20.0, 400.0, 0), span("Upper Heading", 0, 20.0, 100.0, 1)],
            vec![span("Page Two Heading", 1, 20.0, 50.0, 0)],
        ];
        let title = detector().detect(&pages).unwrap();
        assert_eq!(title.text, "Upper Heading");
    }

    #[test]
    fn test_denylist() {
        let d = detector();
        assert!(!d.is_eligible("12"));
        assert!(!d.is_eligible("Page 3 of 10"));
        assert!(!d.is_eligible("- 4 -"));
        assert!(!d.is_eligible("XVIII"));
        assert!(!d.is_eligible("© 2024 Example Corp. All rights reserved"));
        assert!(!d.is_eligible("www.example.com"));
        assert!(!d.is_eligible("draft copy"));
        assert!(!d.is_eligible("Abc"));
        assert!(!d.is_eligible(&"Long ".repeat(40)));
        assert!(d.is_eligible("RFP: Digital Library Proposal"));
    }

    #[test]
    fn test_only_first_three_pages_scanned() {
        let pages = vec![
            vec![span("Small Title Text", 0, 14.0, 100.0, 0)],
            vec![],
            vec![],
            vec![span("Huge Late Banner", 3, 40.0, 100.0, 0)],
        ];
        let title = detector().detect(&pages).unwrap();
        assert_eq!(title.text, "Small Title Text");
    }

    #[test]
    fn test_no_candidate() {
        let pages = vec![vec![span("7", 0, 30.0, 700.0, 0)]];
        assert!(detector().detect(&pages).is_none());
        assert!(detector().detect(&[]).is_none());
    }

    #[test]
    fn test_multi_line_title_merged() {
        let pages = vec![vec![
            span("Overview of the", 0, 24.0, 100.0, 0),
            span("Digital Library Programme", 0, 24.0, 128.0, 1),
            span("Body text follows here.", 0, 11.0, 200.0, 2),
        ]];
        let title = detector().detect(&pages).unwrap();
        assert_eq!(title.text, "Overview of the Digital Library Programme");
        assert_eq!(title.spans, vec![(0, 0), (0, 1)]);
    }

    #[test]
    fn test_same_line_spans_joined() {
        let mut a = span("Annual", 0, 22.0, 90.0, 5);
        a.bbox = BBox::new(72.0, 90.0, 150.0, 112.0);
        let mut b = span("Report 2024", 0, 22.0, 90.0, 5);
        b.bbox = BBox::new(160.0, 90.0, 300.0, 112.0);
        let pages = vec![vec![b, a]];

        let title = detector().detect(&pages).unwrap();
        assert_eq!(title.text, "Annual Report 2024");
        assert_eq!(title.spans, vec![(0, 1), (0, 0)]);
    }
}
