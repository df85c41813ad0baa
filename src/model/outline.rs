//! Outline-level types: heading levels, headings, and the final outline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Heading level in the three-level outline hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    /// Top level
    H1,
    /// Second level
    H2,
    /// Third level
    H3,
}

impl HeadingLevel {
    /// All levels, top first.
    pub const ALL: [HeadingLevel; 3] = [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3];

    /// Level for a 0-based rank; ranks past the third fold into H3.
    pub fn from_rank(rank: usize) -> Self {
        match rank {
            0 => HeadingLevel::H1,
            1 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    /// 0-based rank of this level.
    pub fn rank(self) -> usize {
        match self {
            HeadingLevel::H1 => 0,
            HeadingLevel::H2 => 1,
            HeadingLevel::H3 => 2,
        }
    }

    /// Label used in serialized output ("H1", "H2", "H3").
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level
    pub level: HeadingLevel,

    /// Heading text
    pub text: String,

    /// Page number (1-indexed)
    pub page: u32,
}

impl Heading {
    /// Create a new heading.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// Document outline: a title plus headings in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Document title (may be empty)
    pub title: String,

    /// Headings ordered by page, then vertical position
    pub outline: Vec<Heading>,
}

impl Outline {
    /// Create an outline.
    pub fn new(title: impl Into<String>, headings: Vec<Heading>) -> Self {
        Self {
            title: title.into(),
            outline: headings,
        }
    }

    /// Outline returned for documents that could not be read.
    pub fn fallback(identifier: impl Into<String>) -> Self {
        Self::new(identifier, Vec::new())
    }

    /// Number of headings.
    pub fn len(&self) -> usize {
        self.outline.len()
    }

    /// Check if the outline has no headings.
    pub fn is_empty(&self) -> bool {
        self.outline.is_empty()
    }

    /// Count headings at the given level.
    pub fn count_level(&self, level: HeadingLevel) -> usize {
        self.outline.iter().filter(|h| h.level == level).count()
    }

    /// Iterate over headings at the given level.
    pub fn headings_at(&self, level: HeadingLevel) -> impl Iterator<Item = &Heading> {
        self.outline.iter().filter(move |h| h.level == level)
    }
}
