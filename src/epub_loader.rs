//! EPUB loading utilities.
//!
//! Walks the spine in reading order and hands back each XHTML document
//! untouched; text extraction and cleanup happen later in the pipeline.

use crate::engine::{ContentDocument, SourceMetadata};
use anyhow::{Context, Result};
use epub::doc::EpubDoc;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::path::Path;
use tracing::{debug, info};

static TITLE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["h1", "h2", "h3", "title"]
        .iter()
        .map(|tag| Selector::parse(tag).unwrap())
        .collect()
});

/// Load every XHTML document in spine order.
pub fn read_documents(path: &Path) -> Result<Vec<ContentDocument>> {
    info!(path = %path.display(), "Loading EPUB content");
    let mut doc =
        EpubDoc::new(path).with_context(|| format!("Failed to open EPUB at {}", path.display()))?;

    let mut documents = Vec::new();
    let mut position = 0usize;

    loop {
        position += 1;
        let id = doc
            .get_current_id()
            .unwrap_or_else(|| format!("item-{position}"));
        match doc.get_current_str() {
            Some((markup, mime)) if is_markup_mime(&mime) => {
                debug!(id = %id, chars = markup.len(), "Read content document");
                documents.push(ContentDocument { id, markup });
            }
            Some((_, mime)) => debug!(id = %id, %mime, "Skipping non-markup spine item"),
            None => debug!(id = %id, "Spine item has no readable content"),
        }

        if !doc.go_next() {
            break;
        }
    }

    info!(
        documents = documents.len(),
        "Finished loading EPUB content"
    );
    Ok(documents)
}

pub fn read_metadata(path: &Path) -> Result<SourceMetadata> {
    let doc =
        EpubDoc::new(path).with_context(|| format!("Failed to open EPUB at {}", path.display()))?;
    let field = |name: &str| {
        doc.mdata(name)
            .map(|item| item.value.trim().to_string())
            .filter(|value| !value.is_empty())
    };
    Ok(SourceMetadata {
        title: field("title"),
        author: field("creator"),
        language: field("language"),
        publisher: field("publisher"),
    })
}

/// Text of the first non-empty `h1`, `h2`, `h3` or `title`, checked in that
/// order.
pub fn document_title(markup: &str) -> Option<String> {
    let html = Html::parse_document(markup);
    TITLE_SELECTORS.iter().find_map(|selector| {
        html.select(selector).find_map(|element| {
            let text = element.text().collect::<Vec<_>>().join(" ");
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            (!text.is_empty()).then_some(text)
        })
    })
}

fn is_markup_mime(mime: &str) -> bool {
    let mime = mime.to_ascii_lowercase();
    mime.contains("xhtml") || mime.contains("html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{BookMetadata, Chapter, OutputBook};
    use crate::epub_writer::write_epub;

    #[test]
    fn title_prefers_h1_then_h2_then_title() {
        let markup = "<html><head><title>Doc</title></head><body><h2>Second</h2><h1>  The\n First </h1></body></html>";
        assert_eq!(document_title(markup).as_deref(), Some("The First"));

        let markup = "<html><head><title>Doc</title></head><body><h3>Third</h3></body></html>";
        assert_eq!(document_title(markup).as_deref(), Some("Third"));

        let markup = "<html><head><title>Doc</title></head><body><p>x</p></body></html>";
        assert_eq!(document_title(markup).as_deref(), Some("Doc"));
    }

    #[test]
    fn empty_headings_are_skipped() {
        let markup = "<html><body><h1> </h1><h2>Real</h2></body></html>";
        assert_eq!(document_title(markup).as_deref(), Some("Real"));
        assert_eq!(document_title("<p>No heading</p>"), None);
    }

    #[test]
    fn reads_back_a_written_container() {
        let dir = tempfile::tempdir().expect("temp dir should exist");
        let path = dir.path().join("book.epub");
        let book = OutputBook {
            metadata: BookMetadata {
                identifier: "urn:uuid:00000000-0000-4000-8000-000000000000".to_string(),
                title: "Harbour Lights".to_string(),
                author: "A. Keeper".to_string(),
                language: "en".to_string(),
                publisher: "Self-published".to_string(),
                date: "2026-01-01".to_string(),
            },
            chapters: vec![
                Chapter {
                    title: "One".to_string(),
                    file_name: "chapter_1.xhtml".to_string(),
                    body: "<h1>One</h1>\n<p>The keeper lit the lamp.</p>".to_string(),
                },
                Chapter {
                    title: "Two".to_string(),
                    file_name: "chapter_2.xhtml".to_string(),
                    body: "<h1>Two</h1>\n<p>The ship came home.</p>".to_string(),
                },
            ],
        };
        write_epub(&book, &path).expect("epub should be written");

        let documents = read_documents(&path).expect("epub should load");
        assert_eq!(documents.len(), 2);
        assert!(documents[0].markup.contains("The keeper lit the lamp."));
        assert!(documents[1].markup.contains("The ship came home."));
        assert_eq!(document_title(&documents[1].markup).as_deref(), Some("Two"));

        let meta = read_metadata(&path).expect("metadata should load");
        assert_eq!(meta.title.as_deref(), Some("Harbour Lights"));
        assert_eq!(meta.author.as_deref(), Some("A. Keeper"));
        assert_eq!(meta.language.as_deref(), Some("en"));
        assert_eq!(meta.publisher.as_deref(), Some("Self-published"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_documents(Path::new("/definitely/not/here.epub")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to open EPUB"));
    }
}
