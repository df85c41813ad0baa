//! In-memory span provider.

use crate::error::{Error, Result};
use crate::model::TextSpan;

use super::SpanProvider;

/// Span provider backed by spans already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySpanProvider {
    identifier: String,
    pages: Vec<Vec<TextSpan>>,
}

impl MemorySpanProvider {
    /// Create a provider from per-page span lists.
    pub fn new(identifier: impl Into<String>, pages: Vec<Vec<TextSpan>>) -> Self {
        Self {
            identifier: identifier.into(),
            pages,
        }
    }

    /// Create a provider from a flat span list, grouping by each span's page.
    ///
    /// The page count is one past the highest page index seen.
    pub fn from_spans(identifier: impl Into<String>, spans: Vec<TextSpan>) -> Self {
        let page_count = spans.iter().map(|s| s.page + 1).max().unwrap_or(0) as usize;
        let mut pages = vec![Vec::new(); page_count];
        for span in spans {
            pages[span.page as usize].push(span);
        }
        Self::new(identifier, pages)
    }

    /// Append a page of spans.
    pub fn push_page(&mut self, spans: Vec<TextSpan>) {
        self.pages.push(spans);
    }
}

impl SpanProvider for MemorySpanProvider {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn page_count(&self) -> Result<u32> {
        Ok(self.pages.len() as u32)
    }

    fn page_spans(&self, page: u32) -> Result<Vec<TextSpan>> {
        self.pages
            .get(page as usize)
            .cloned()
            .ok_or(Error::PageOutOfRange(page, self.pages.len() as u32))
    }
}
