//! # pdfoutline
//!
//! Heading-outline extraction for text documents.
//!
//! Given per-page text spans with font size, weight and position, this
//! library picks the document title and classifies heading lines into three
//! levels (H1, H2, H3), producing a JSON-ready outline.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{extract_outline_from_file, to_json, JsonFormat};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     // Spans previously dumped by an external text extractor
//!     let outline = extract_outline_from_file("report.spans.json")?;
//!     println!("{}", to_json(&outline, JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Title detection**: largest eligible text on the first pages
//! - **Multi-signal classification**: numbering patterns, section-name
//!   vocabulary, and typography
//! - **Level refinement**: levels re-anchored on observed font-size clusters
//! - **Never fails on bad input**: unreadable documents yield
//!   `{title: identifier, outline: []}`
//! - **Parallel batches**: uses Rayon across documents

pub mod batch;
pub mod classify;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod render;

// Re-export commonly used types
pub use batch::{extract_batch, extract_files, spawn_batch, BatchItem, BatchSummary};
pub use classify::{ClassifierConfig, PatternSet, TypographyWeights};
pub use error::{Error, Result};
pub use model::{BBox, Heading, HeadingLevel, LineId, Outline, TextSpan};
pub use pipeline::{
    ExtractionStats, OutlineBuilder, OutlineExtractor, OutlineOptions, OutlineResult, Stage,
};
pub use provider::{JsonSpanProvider, MemorySpanProvider, SpanFile, SpanProvider};
pub use render::{to_text, JsonFormat};

use std::path::Path;

/// Extract the outline of a document with default options.
///
/// Provider failures do not surface as errors; they yield the fallback
/// outline `{title: identifier, outline: []}`.
///
/// # Example
///
/// ```
/// use pdfoutline::{extract_outline, BBox, MemorySpanProvider, TextSpan};
///
/// let spans = vec![
///     TextSpan::new("Field Survey Report", 0, 24.0, true, BBox::new(72.0, 60.0, 400.0, 84.0), 0),
///     TextSpan::new("1. Introduction", 0, 14.0, true, BBox::new(72.0, 120.0, 220.0, 134.0), 1),
/// ];
/// let provider = MemorySpanProvider::new("survey", vec![spans]);
/// let outline = extract_outline(&provider).unwrap();
/// assert_eq!(outline.title, "Field Survey Report");
/// assert_eq!(outline.outline[0].text, "1. Introduction");
/// ```
pub fn extract_outline<P: SpanProvider + ?Sized>(provider: &P) -> Result<Outline> {
    extract_outline_with_options(provider, OutlineOptions::default())
}

/// Extract the outline of a document with custom options.
///
/// Errors only when the options are invalid (bad pattern, inconsistent
/// thresholds).
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use pdfoutline::{extract_outline_with_options, JsonSpanProvider, OutlineOptions};
///
/// let provider = JsonSpanProvider::open("report.spans.json")?;
/// let options = OutlineOptions::new().with_time_budget(Duration::from_secs(5));
/// let outline = extract_outline_with_options(&provider, options)?;
/// # Ok::<(), pdfoutline::Error>(())
/// ```
pub fn extract_outline_with_options<P: SpanProvider + ?Sized>(
    provider: &P,
    options: OutlineOptions,
) -> Result<Outline> {
    let extractor = OutlineExtractor::new(options)?;
    Ok(extractor.extract(provider).outline)
}

/// Extract the outline of a JSON span dump.
///
/// A missing or malformed file yields the fallback outline named after the
/// file stem.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::extract_outline_from_file;
///
/// let outline = extract_outline_from_file("report.spans.json").unwrap();
/// for heading in &outline.outline {
///     println!("{} {} (p. {})", heading.level, heading.text, heading.page);
/// }
/// ```
pub fn extract_outline_from_file<P: AsRef<Path>>(path: P) -> Result<Outline> {
    let extractor = OutlineExtractor::new(OutlineOptions::default())?;
    Ok(extractor.extract_file(path).outline)
}

/// Convert an outline to JSON.
///
/// # Example
///
/// ```
/// use pdfoutline::{to_json, Heading, HeadingLevel, JsonFormat, Outline};
///
/// let outline = Outline::new("Guide", vec![Heading::new(HeadingLevel::H1, "Setup", 1)]);
/// let json = to_json(&outline, JsonFormat::Compact).unwrap();
/// assert_eq!(json, r#"{"title":"Guide","outline":[{"level":"H1","text":"Setup","page":1}]}"#);
/// ```
pub fn to_json(outline: &Outline, format: JsonFormat) -> Result<String> {
    render::to_json(outline, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_stem() {
        let outline = extract_outline_from_file("/nonexistent/dir/minutes-2024.json").unwrap();
        assert_eq!(outline.title, "minutes-2024");
        assert!(outline.outline.is_empty());
    }

    #[test]
    fn test_invalid_options_error() {
        let provider = MemorySpanProvider::new("doc", vec![]);
        let options = OutlineOptions::new().with_classifier(ClassifierConfig {
            patterns: PatternSet {
                h1: vec!["[".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(matches!(
            extract_outline_with_options(&provider, options),
            Err(Error::InvalidPattern(_))
        ));
    }
}
