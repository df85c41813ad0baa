//! Data model for outline extraction.
//!
//! Spans come in from a provider, outlines go out. The intermediate
//! candidate types live in [`crate::classify`].

mod outline;
mod span;

pub use outline::{Heading, HeadingLevel, Outline};
pub use span::{BBox, LineId, TextSpan};
