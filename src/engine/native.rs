use super::{ContentDocument, Engine, ExtractedPage, OutputBook, SourceMetadata};
use crate::{epub_loader, epub_writer, pdf_loader};
use anyhow::Result;
use std::path::Path;

/// Library-backed engine: `lopdf` for pages, `epub` for containers, `zip` for
/// output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEngine;

impl Engine for NativeEngine {
    fn extract_pages(&self, input: &Path) -> Result<Vec<ExtractedPage>> {
        pdf_loader::extract_pages(input)
    }

    fn read_documents(&self, input: &Path) -> Result<Vec<ContentDocument>> {
        epub_loader::read_documents(input)
    }

    fn read_epub_metadata(&self, input: &Path) -> Result<SourceMetadata> {
        epub_loader::read_metadata(input)
    }

    fn read_pdf_metadata(&self, input: &Path) -> Result<SourceMetadata> {
        pdf_loader::read_metadata(input)
    }

    fn write_container(&self, book: &OutputBook, output: &Path) -> Result<()> {
        epub_writer::write_epub(book, output)
    }
}
