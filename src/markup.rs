//! Markup cleanup for surviving content units.
//!
//! Works on the serialized XHTML with a handful of regex passes, in the same
//! spirit as the text normalizer in the reader: presentational noise goes,
//! structure stays.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*)</body\s*>").unwrap());
static RE_STYLE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\s+style\s*=\s*(?:"[^"]*"|'[^']*')"#).unwrap());
static RE_FONT_CENTER_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?(?:font|center)\b[^>]*>").unwrap());
static RE_BR_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\b[^>]*>(?:\s*<br\b[^>]*>)+").unwrap());
static RE_EXCESS_BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n\s*\n+").unwrap());

/// Strip presentational styling and collapse redundant breaks.
///
/// Returns the inner content of `<body>` when the input is a full document,
/// otherwise the whole input, cleaned.
pub fn normalize_markup(raw: &str) -> String {
    let content = RE_BODY
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or(raw, |body| body.as_str());

    let content = RE_STYLE_ATTR.replace_all(content, "");
    let content = RE_FONT_CENTER_TAG.replace_all(&content, "");
    let content = RE_BR_RUN.replace_all(&content, "<br/>");
    let content = RE_EXCESS_BLANK_LINES.replace_all(&content, "\n\n");

    content.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_style_attributes_everywhere() {
        let raw = r#"<p style="color:red" class="x">A</p><span STYLE='font-size:9pt'>B</span>"#;
        assert_eq!(
            normalize_markup(raw),
            r#"<p class="x">A</p><span>B</span>"#
        );
    }

    #[test]
    fn unwraps_font_and_center() {
        let raw = r#"<center><font face="Arial" size="3">Title</font></center>"#;
        assert_eq!(normalize_markup(raw), "Title");
    }

    #[test]
    fn collapses_consecutive_line_breaks() {
        let raw = "<p>One<br/><br />\n<br>Two<br/>Three</p>";
        assert_eq!(normalize_markup(raw), "<p>One<br/>Two<br/>Three</p>");
    }

    #[test]
    fn collapses_runs_of_blank_lines() {
        let raw = "<p>A</p>\n\n\n\n<p>B</p>\n  \n\t\n<p>C</p>\n\n<p>D</p>";
        assert_eq!(
            normalize_markup(raw),
            "<p>A</p>\n\n<p>B</p>\n\n<p>C</p>\n\n<p>D</p>"
        );
    }

    #[test]
    fn keeps_only_body_content() {
        let raw = r#"<?xml version="1.0"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>T</title>
<style>p { color: red; }</style></head>
<body class="chapter" style="margin:0">
<h1>Chapter 1</h1>
<p>Text.</p>
</body></html>"#;
        assert_eq!(normalize_markup(raw), "<h1>Chapter 1</h1>\n<p>Text.</p>");
    }

    #[test]
    fn plain_fragment_passes_through() {
        assert_eq!(normalize_markup("<p>Hello</p>"), "<p>Hello</p>");
        assert_eq!(normalize_markup(""), "");
    }
}
