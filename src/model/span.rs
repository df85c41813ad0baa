//! Positioned text spans as delivered by a span provider.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in points.
///
/// The origin is the top-left corner of the page and `y` grows downward,
/// so a smaller `y0` means higher on the page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Box width.
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    /// Box height.
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

impl From<[f32; 4]> for BBox {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f32; 4] {
    fn from(b: BBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

/// Opaque identifier grouping spans that sit on the same visual line.
///
/// Only equality matters; identifiers are unique within a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub u64);

/// A contiguous run of text on a page sharing font and position attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// The text content
    pub text: String,

    /// Page index (0-based)
    #[serde(default)]
    pub page: u32,

    /// Font size in points
    pub font_size: f32,

    /// Whether the font is bold
    #[serde(default)]
    pub bold: bool,

    /// Bounding box on the page
    pub bbox: BBox,

    /// Visual line this span belongs to
    pub line_id: LineId,
}

impl TextSpan {
    /// Create a new text span.
    pub fn new(
        text: impl Into<String>,
        page: u32,
        font_size: f32,
        bold: bool,
        bbox: BBox,
        line_id: u64,
    ) -> Self {
        Self {
            text: text.into(),
            page,
            font_size,
            bold,
            bbox,
            line_id: LineId(line_id),
        }
    }

    /// Whether the span carries usable geometry and typography.
    ///
    /// Spans with a non-finite or non-positive font size, or a non-finite
    /// box, come from damaged content streams and are skipped.
    pub fn is_well_formed(&self) -> bool {
        self.font_size.is_finite()
            && self.font_size > 0.0
            && [self.bbox.x0, self.bbox.y0, self.bbox.x1, self.bbox.y1]
                .iter()
                .all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_serializes_as_array() {
        let bbox = BBox::new(10.0, 20.0, 110.0, 32.0);
        let json = serde_json::to_string(&bbox).unwrap();
        assert_eq!(json, "[10.0,20.0,110.0,32.0]");

        let back: BBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bbox);
    }

    #[test]
    fn test_bbox_union() {
        let a = BBox::new(0.0, 10.0, 50.0, 20.0);
        let b = BBox::new(40.0, 8.0, 90.0, 21.0);
        assert_eq!(a.union(&b), BBox::new(0.0, 8.0, 90.0, 21.0));
        assert_eq!(a.width(), 50.0);
        assert_eq!(a.height(), 10.0);
    }

    #[test]
    fn test_span_deserialize_defaults() {
        let json = r#"{"text":"Scope","font_size":14.0,"bbox":[72,100,130,114],"line_id":3}"#;
        let span: TextSpan = serde_json::from_str(json).unwrap();
        assert_eq!(span.page, 0);
        assert!(!span.bold);
        assert_eq!(span.line_id, LineId(3));
    }

    #[test]
    fn test_span_well_formed() {
        let bbox = BBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(TextSpan::new("a", 0, 12.0, false, bbox, 0).is_well_formed());
        assert!(!TextSpan::new("a", 0, 0.0, false, bbox, 0).is_well_formed());
        assert!(!TextSpan::new("a", 0, f32::NAN, false, bbox, 0).is_well_formed());
    }
}
