use tracing::warn;

/// One page or chapter-equivalent block extracted from a source document.
///
/// `plain_text` is fixed at construction; only `markup` is rewritten, once,
/// when the unit survives deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUnit {
    title: String,
    markup: String,
    plain_text: String,
}

impl ContentUnit {
    /// Build a unit whose text was already extracted alongside the markup.
    pub fn new(
        title: impl Into<String>,
        markup: impl Into<String>,
        plain_text: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            markup: markup.into(),
            plain_text: plain_text.into(),
        }
    }

    /// Build a unit from markup alone, deriving the reader-visible text now.
    pub fn from_markup(title: impl Into<String>, markup: impl Into<String>) -> Self {
        let markup = markup.into();
        let plain_text = markup_to_text(&markup);
        Self {
            title: title.into(),
            markup,
            plain_text,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn plain_text(&self) -> &str {
        &self.plain_text
    }

    /// Replace the markup through `rewrite`, keeping title and text intact.
    pub fn map_markup(self, rewrite: impl FnOnce(&str) -> String) -> Self {
        let markup = rewrite(&self.markup);
        Self { markup, ..self }
    }

    pub fn into_parts(self) -> (String, String, String) {
        (self.title, self.markup, self.plain_text)
    }
}

/// Strip markup with a wide wrap width so no hard line breaks are baked in.
/// Falls back to the raw markup when the HTML cannot be rendered.
pub fn markup_to_text(markup: &str) -> String {
    match html2text::from_read(markup.as_bytes(), 10_000) {
        Ok(text) => text,
        Err(err) => {
            warn!("html2text failed, keeping raw markup as text: {err}");
            markup.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_markup_derives_text_once() {
        let unit = ContentUnit::from_markup(
            "Chapter 1",
            "<html><body><p>It was a <b>dark</b> night.</p></body></html>",
        );
        assert!(unit.plain_text().contains("It was a"));
        assert!(unit.plain_text().contains("night."));
        assert!(!unit.plain_text().contains("<p>"));
    }

    #[test]
    fn map_markup_keeps_text() {
        let unit = ContentUnit::new("Page 1", "<p style=\"x\">Hi</p>", "Hi");
        let unit = unit.map_markup(|raw| raw.replace(" style=\"x\"", ""));
        assert_eq!(unit.markup(), "<p>Hi</p>");
        assert_eq!(unit.plain_text(), "Hi");
        assert_eq!(unit.title(), "Page 1");
    }
}
