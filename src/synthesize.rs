//! Markup synthesis for fixed-layout pages.

use crate::engine::TextRun;
use quick_xml::escape::escape;

/// Runs set larger than this become second-level headings.
const H2_MIN_FONT_SIZE: f32 = 16.0;
/// Runs set larger than this (and not an `h2`) become third-level headings.
const H3_MIN_FONT_SIZE: f32 = 14.0;

/// Turn positioned runs into simple XHTML.
///
/// Large runs become headings, everything else on a line is joined into one
/// paragraph. When no run yields content the fallback text is split on blank
/// lines instead.
pub fn synthesize_markup(runs: &[TextRun], fallback_text: &str) -> String {
    let mut parts = Vec::new();

    let mut start = 0;
    while start < runs.len() {
        let line = runs[start].line;
        let end = runs[start..]
            .iter()
            .position(|run| run.line != line)
            .map_or(runs.len(), |offset| start + offset);
        if let Some(markup) = line_markup(&runs[start..end]) {
            parts.push(markup);
        }
        start = end;
    }

    if parts.is_empty() {
        parts = fallback_text
            .split("\n\n")
            .map(str::trim)
            .filter(|para| !para.is_empty())
            .map(|para| format!("<p>{}</p>", escape(para)))
            .collect();
    }

    parts.join("\n")
}

fn line_markup(runs: &[TextRun]) -> Option<String> {
    let mut line = String::new();
    for run in runs {
        if run.font_size > H2_MIN_FONT_SIZE {
            line.push_str(&format!("<h2>{}</h2>", escape(run.text.trim())));
        } else if run.font_size > H3_MIN_FONT_SIZE {
            line.push_str(&format!("<h3>{}</h3>", escape(run.text.trim())));
        } else {
            line.push_str(&escape(run.text.as_str()));
            line.push(' ');
        }
    }

    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line.starts_with("<h") {
        Some(line.to_string())
    } else {
        Some(format!("<p>{line}</p>"))
    }
}
