//! Heading classification.
//!
//! The classifier turns a document's spans into a title and leveled
//! headings:
//!
//! 1. [`TitleDetector`] picks the title from the first pages.
//! 2. [`extract_candidates`] merges the remaining spans into lines.
//! 3. [`PatternMatcher`], [`KeywordRecognizer`] and [`TypographyScorer`]
//!    attach [`Signals`] to each candidate.
//! 4. [`LevelAssigner`] resolves a level or rejects the candidate.
//! 5. [`postprocess`] removes repeats, re-anchors levels on font sizes and
//!    converts to 1-based pages.

mod candidate;
mod keyword;
mod level;
mod normalize;
mod options;
mod pattern;
pub mod postprocess;
mod title;
mod typography;

pub use candidate::{extract_candidates, HeadingCandidate, Position, Signals, SpanRef};
pub use keyword::KeywordRecognizer;
pub use level::{resolve_level, AssignedHeading, LevelAssigner, LevelSource};
pub use normalize::{comparison_key, display_text, keyword_key};
pub use options::{ClassifierConfig, PatternSet, TypographyWeights};
pub use pattern::PatternMatcher;
pub use title::{TitleDetector, TitleSelection};
pub use typography::{CutPoints, FontSample, TypographyScorer};
