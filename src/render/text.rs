//! Plain text rendering for outlines.

use std::fmt::Write;

use crate::model::Outline;

/// Render an outline as an indented tree, one heading per line.
///
/// H2 headings are indented one step below H1, H3 two steps. Each line ends
/// with the 1-based page number.
pub fn to_text(outline: &Outline) -> String {
    let mut output = String::new();
    let title = if outline.title.is_empty() {
        "(untitled)"
    } else {
        outline.title.as_str()
    };
    let _ = writeln!(output, "{}", title);

    for heading in &outline.outline {
        let indent = "  ".repeat(heading.level.rank() + 1);
        let _ = writeln!(
            output,
            "{}{} {} (p. {})",
            indent, heading.level, heading.text, heading.page
        );
    }

    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Heading, HeadingLevel};

    #[test]
    fn test_to_text() {
        let outline = Outline::new(
            "Field Guide",
            vec![
                Heading::new(HeadingLevel::H1, "Birds", 1),
                Heading::new(HeadingLevel::H2, "Waders", 2),
                Heading::new(HeadingLevel::H3, "Herons", 2),
            ],
        );
        let text = to_text(&outline);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "Field Guide");
        assert_eq!(lines[1], "  H1 Birds (p. 1)");
        assert_eq!(lines[2], "    H2 Waders (p. 2)");
        assert_eq!(lines[3], "      H3 Herons (p. 2)");
    }

    #[test]
    fn test_untitled() {
        assert_eq!(to_text(&Outline::default()), "(untitled)");
    }
}
