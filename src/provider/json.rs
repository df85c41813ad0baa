//! Span provider reading JSON span dumps.
//!
//! A span dump is the output of an external text extractor:
//!
//! ```json
//! {
//!   "pages": [
//!     [
//!       {"text": "1. Introduction", "font_size": 16.0, "bold": true,
//!        "bbox": [72.0, 90.0, 240.0, 106.0], "line_id": 0}
//!     ]
//!   ]
//! }
//! ```

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::TextSpan;

use super::SpanProvider;

/// On-disk layout of a span dump.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanFile {
    /// Spans per page, pages in order
    pub pages: Vec<Vec<TextSpan>>,
}

impl SpanFile {
    /// Total number of spans across all pages.
    pub fn span_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }
}

/// Span provider backed by a parsed span dump.
#[derive(Debug, Clone)]
pub struct JsonSpanProvider {
    identifier: String,
    file: SpanFile,
}

impl JsonSpanProvider {
    /// Open a span dump file. The identifier is the file stem.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        Self::from_bytes(identifier_for_path(path), &data)
    }

    /// Parse a span dump from bytes.
    pub fn from_bytes(identifier: impl Into<String>, data: &[u8]) -> Result<Self> {
        let identifier = identifier.into();
        if data.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::Unreadable(format!("{}: empty span dump", identifier)));
        }

        let file: SpanFile = serde_json::from_slice(data)?;
        log::debug!(
            "Loaded span dump '{}': {} pages, {} spans",
            identifier,
            file.pages.len(),
            file.span_count()
        );

        Ok(Self { identifier, file })
    }

    /// Parse a span dump from a reader.
    pub fn from_reader<R: Read>(identifier: impl Into<String>, mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(identifier, &data)
    }

    /// Access the parsed dump.
    pub fn span_file(&self) -> &SpanFile {
        &self.file
    }
}

impl SpanProvider for JsonSpanProvider {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn page_count(&self) -> Result<u32> {
        Ok(self.file.pages.len() as u32)
    }

    fn page_spans(&self, page: u32) -> Result<Vec<TextSpan>> {
        self.file
            .pages
            .get(page as usize)
            .cloned()
            .ok_or(Error::PageOutOfRange(page, self.file.pages.len() as u32))
    }
}

/// Document identifier for a path: the file stem, or the whole path if it has none.
pub(crate) fn identifier_for_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"{
        "pages": [
            [
                {"text": "Quarterly Review", "font_size": 22.0, "bold": true,
                 "bbox": [72, 60, 300, 84], "line_id": 0},
                {"text": "Body text.", "font_size": 11.0,
                 "bbox": [72, 120, 200, 132], "line_id": 1}
            ],
            []
        ]
    }"#;

    #[test]
    fn test_from_bytes() {
        let provider = JsonSpanProvider::from_bytes("review", DUMP.as_bytes()).unwrap();
        assert_eq!(provider.identifier(), "review");
        assert_eq!(provider.page_count().unwrap(), 2);
        assert_eq!(provider.page_spans(0).unwrap().len(), 2);
        assert!(provider.page_spans(1).unwrap().is_empty());
        assert_eq!(provider.span_file().span_count(), 2);
    }

    #[test]
    fn test_empty_bytes_unreadable() {
        let result = JsonSpanProvider::from_bytes("empty", b"  \n");
        assert!(matches!(result, Err(Error::Unreadable(_))));
    }

    #[test]
    fn test_malformed_json() {
        let result = JsonSpanProvider::from_bytes("broken", b"{\"pages\": [[{\"text\": ");
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_identifier_for_path() {
        assert_eq!(identifier_for_path(Path::new("/tmp/report.spans.json")), "report.spans");
        assert_eq!(identifier_for_path(Path::new("notes")), "notes");
    }

    #[test]
    fn test_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quarterly.json");
        fs::write(&path, DUMP).unwrap();

        let provider = JsonSpanProvider::open(&path).unwrap();
        assert_eq!(provider.identifier(), "quarterly");
    }
}
