//! Span provider abstraction.
//!
//! A provider turns some document representation into positioned text spans,
//! page by page. Parsing raw PDF bytes is left to external tools; the
//! providers here read spans that were already extracted.

mod json;
mod memory;

pub(crate) use json::identifier_for_path;
pub use json::{JsonSpanProvider, SpanFile};
pub use memory::MemorySpanProvider;

use crate::error::Result;
use crate::model::TextSpan;

/// Abstract source of positioned text spans for one document.
///
/// Implementations report failures through `Result`; the pipeline turns any
/// provider error into the fallback outline for that document.
pub trait SpanProvider {
    /// External identifier of the document (e.g. the file stem).
    fn identifier(&self) -> &str;

    /// Number of pages in the document.
    fn page_count(&self) -> Result<u32>;

    /// Spans on the given page (0-based), in content order.
    fn page_spans(&self, page: u32) -> Result<Vec<TextSpan>>;
}

impl<P: SpanProvider + ?Sized> SpanProvider for &P {
    fn identifier(&self) -> &str {
        (**self).identifier()
    }

    fn page_count(&self) -> Result<u32> {
        (**self).page_count()
    }

    fn page_spans(&self, page: u32) -> Result<Vec<TextSpan>> {
        (**self).page_spans(page)
    }
}

impl<P: SpanProvider + ?Sized> SpanProvider for Box<P> {
    fn identifier(&self) -> &str {
        (**self).identifier()
    }

    fn page_count(&self) -> Result<u32> {
        (**self).page_count()
    }

    fn page_spans(&self, page: u32) -> Result<Vec<TextSpan>> {
        (**self).page_spans(page)
    }
}

/// Read every page of a provider once.
///
/// Spans are re-stamped with the page index they were requested for, so a
/// provider that leaves `page` at its default still yields consistent data.
pub fn read_all_pages<P: SpanProvider + ?Sized>(provider: &P) -> Result<Vec<Vec<TextSpan>>> {
    let page_count = provider.page_count()?;
    // A damaged provider may report an absurd page count
    let mut pages = Vec::with_capacity(page_count.min(1024) as usize);

    for page in 0..page_count {
        let mut spans = provider.page_spans(page)?;
        for span in &mut spans {
            span.page = page;
        }
        pages.push(spans);
    }

    Ok(pages)
}
