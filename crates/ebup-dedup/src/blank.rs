use crate::text::normalize;

/// Units with fewer visible characters than this are treated as blank pages.
pub const DEFAULT_BLANK_MIN_CHARS: usize = 10;

/// Blank check with the default threshold.
pub fn is_blank(text: &str) -> bool {
    is_blank_with(text, DEFAULT_BLANK_MIN_CHARS)
}

/// A unit is blank when its normalized text, with every whitespace character
/// removed, has fewer than `min_chars` characters. Catches pages holding only a
/// page number or a stray glyph.
pub fn is_blank_with(text: &str, min_chars: usize) -> bool {
    let visible = normalize(text)
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .count();
    visible < min_chars
}
