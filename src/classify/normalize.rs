//! Unicode normalization and text predicates shared by the classifiers.
//!
//! Three forms of a line's text are used:
//! - display text: NFC, ligatures expanded, whitespace collapsed
//! - comparison key: NFKC, lowercased, whitespace collapsed (deduplication)
//! - keyword key: comparison key with diacritics folded and edge punctuation stripped

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Collapse runs of whitespace (including NBSP) into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{00A0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn expand_ligatures(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match LIGATURES.iter().find(|(lig, _)| *lig == c) {
            Some((_, replacement)) => out.push_str(replacement),
            None => out.push(c),
        }
    }
    out
}

/// Text as it appears in the outline.
pub fn display_text(text: &str) -> String {
    let composed: String = text.nfc().collect();
    collapse_whitespace(&expand_ligatures(&composed))
}

/// Key used to decide whether two lines carry the same text.
pub fn comparison_key(text: &str) -> String {
    let compat: String = text.nfkc().collect();
    collapse_whitespace(&compat.to_lowercase())
}

/// Key used for vocabulary lookup.
///
/// Accented and unaccented spellings fold together ("Références" and
/// "references"), and trailing colons or numbering punctuation are ignored.
pub fn keyword_key(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    let collapsed = collapse_whitespace(&folded);
    collapsed
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// True when the text has letters and all of them are uppercase.
pub fn is_all_caps(text: &str) -> bool {
    let mut seen_letter = false;
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        if !c.is_uppercase() {
            return false;
        }
        seen_letter = true;
    }
    seen_letter
}

/// True when the text has letters and all of them are lowercase.
pub fn is_all_lowercase(text: &str) -> bool {
    let mut seen_letter = false;
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        if !c.is_lowercase() {
            return false;
        }
        seen_letter = true;
    }
    seen_letter
}

/// True when the line ends like running prose.
pub fn ends_like_sentence(text: &str) -> bool {
    matches!(text.trim_end().chars().last(), Some('.' | ',' | ';'))
}

/// True when the text contains at least one letter.
pub fn has_letter(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
}
