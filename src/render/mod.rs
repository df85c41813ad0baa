//! Outline rendering.
//!
//! - [`to_json`]: the `{"title", "outline"}` document, pretty or compact
//! - [`to_text`]: an indented tree for terminals

mod json;
mod text;

pub use json::{to_json, JsonFormat};
pub use text::to_text;
