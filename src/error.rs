//! Error types for pdfoutline library.

use std::io;
use thiserror::Error;

/// Result type alias for pdfoutline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting an outline.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A span dump or configuration file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The span provider could not produce spans for the document.
    #[error("Unreadable document: {0}")]
    Unreadable(String),

    /// A heading pattern failed to compile.
    #[error("Invalid heading pattern: {0}")]
    InvalidPattern(String),

    /// Classifier configuration values are inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The per-document time budget ran out.
    #[error("Time budget exceeded: {elapsed_ms} ms elapsed, budget {budget_ms} ms")]
    TimeBudgetExceeded {
        /// Milliseconds spent before the check failed
        elapsed_ms: u64,
        /// Configured budget in milliseconds
        budget_ms: u64,
    },

    /// Page index is out of range for the provider.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Error during rendering (JSON, text).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::InvalidPattern(err.to_string())
    }
}
