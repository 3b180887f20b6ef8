//! Boundary types and the trait the pipeline drives.
//!
//! The pipeline never touches a parser or archive directly; it asks an
//! `Engine` for pages, content documents and metadata, and hands it the
//! finished book. `NativeEngine` is the real implementation; tests swap in a
//! recording mock.

pub mod native;

pub use native::NativeEngine;

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

/// A positioned run of text from a fixed-layout page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub font_size: f32,
    /// Zero-based line number within the page.
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedPage {
    /// Zero-based page index.
    pub index: usize,
    pub plain_text: String,
    pub runs: Vec<TextRun>,
}

/// One XHTML document from a reflowable container, in reading order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentDocument {
    pub id: String,
    pub markup: String,
}

/// Metadata as found in the source; every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub publisher: Option<String>,
}

/// Fully resolved metadata for the output container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookMetadata {
    pub identifier: String,
    pub title: String,
    pub author: String,
    pub language: String,
    pub publisher: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chapter {
    pub title: String,
    pub file_name: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputBook {
    pub metadata: BookMetadata,
    pub chapters: Vec<Chapter>,
}

pub trait Engine {
    fn extract_pages(&self, input: &Path) -> Result<Vec<ExtractedPage>>;
    fn read_documents(&self, input: &Path) -> Result<Vec<ContentDocument>>;
    fn read_epub_metadata(&self, input: &Path) -> Result<SourceMetadata>;
    fn read_pdf_metadata(&self, input: &Path) -> Result<SourceMetadata>;
    fn write_container(&self, book: &OutputBook, output: &Path) -> Result<()>;
}
