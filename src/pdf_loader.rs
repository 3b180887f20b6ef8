//! Fixed-layout page extraction.
//!
//! Each page yields its plain text (via `lopdf`'s text extraction) plus the
//! text runs found by walking the content stream, with the font size active
//! when each run was shown. The runs feed heading inference in `synthesize`.

use crate::engine::{ExtractedPage, SourceMetadata, TextRun};
use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::Path;
use tracing::{debug, info, warn};

/// TJ kerning offsets at or beyond this (in thousandths of an em) read as a
/// word gap.
const TJ_SPACE_THRESHOLD: f32 = -200.0;

pub fn extract_pages(path: &Path) -> Result<Vec<ExtractedPage>> {
    info!(path = %path.display(), "Loading PDF pages");
    let doc =
        Document::load(path).with_context(|| format!("Failed to open PDF at {}", path.display()))?;

    let pages = doc.get_pages();
    let mut extracted = Vec::with_capacity(pages.len());
    for (index, (page_number, page_id)) in pages.into_iter().enumerate() {
        let plain_text = doc
            .extract_text(&[page_number])
            .with_context(|| format!("Failed to extract text from PDF page {page_number}"))?;
        let runs = match page_runs(&doc, page_id) {
            Ok(runs) => runs,
            Err(err) => {
                warn!(
                    page = page_number,
                    "Could not decode page content stream; using plain text only: {err}"
                );
                Vec::new()
            }
        };
        debug!(
            page = page_number,
            chars = plain_text.len(),
            runs = runs.len(),
            "Extracted page"
        );
        extracted.push(ExtractedPage {
            index,
            plain_text,
            runs,
        });
    }

    info!(pages = extracted.len(), "Finished loading PDF pages");
    Ok(extracted)
}

/// Title and author from the document Info dictionary, when present.
pub fn read_metadata(path: &Path) -> Result<SourceMetadata> {
    let doc =
        Document::load(path).with_context(|| format!("Failed to open PDF at {}", path.display()))?;

    let info = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => doc.get_object(*id).ok(),
        Ok(obj) => Some(obj),
        Err(_) => None,
    };
    let Some(Object::Dictionary(dict)) = info else {
        debug!(path = %path.display(), "No Info dictionary in PDF");
        return Ok(SourceMetadata::default());
    };

    Ok(SourceMetadata {
        title: dict_string(dict, b"Title"),
        author: dict_string(dict, b"Author"),
        ..SourceMetadata::default()
    })
}

fn dict_string(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => {
            let value = decode_pdf_string(bytes);
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        }
        _ => None,
    }
}

fn page_runs(doc: &Document, page_id: ObjectId) -> Result<Vec<TextRun>> {
    let data = doc
        .get_page_content(page_id)
        .context("Failed to read page content")?;
    let content = Content::decode(&data).context("Failed to parse page content stream")?;
    Ok(runs_from_operations(&content.operations))
}

#[derive(Default)]
struct RunCollector {
    runs: Vec<TextRun>,
    line: usize,
    line_has_text: bool,
    font_size: f32,
}

impl RunCollector {
    fn break_line(&mut self) {
        if self.line_has_text {
            self.line += 1;
            self.line_has_text = false;
        }
    }

    fn show(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        self.runs.push(TextRun {
            text,
            font_size: self.font_size,
            line: self.line,
        });
        self.line_has_text = true;
    }
}

/// Walk text-showing operators, tracking font size and line changes.
pub fn runs_from_operations(operations: &[Operation]) -> Vec<TextRun> {
    let mut collector = RunCollector {
        font_size: 12.0,
        ..RunCollector::default()
    };

    for op in operations {
        match op.operator.as_str() {
            "BT" | "Td" | "TD" | "T*" | "Tm" => collector.break_line(),
            "Tf" => {
                if let Some(size) = op.operands.get(1).and_then(|o| o.as_float().ok()) {
                    collector.font_size = size.abs();
                }
            }
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    collector.show(decode_pdf_string(bytes));
                }
            }
            "'" => {
                collector.break_line();
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    collector.show(decode_pdf_string(bytes));
                }
            }
            "\"" => {
                collector.break_line();
                if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                    collector.show(decode_pdf_string(bytes));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    collector.show(join_tj_array(items));
                }
            }
            _ => {}
        }
    }

    collector.runs
}

fn join_tj_array(items: &[Object]) -> String {
    let mut text = String::new();
    for item in items {
        match item {
            Object::String(bytes, _) => text.push_str(&decode_pdf_string(bytes)),
            other => {
                if let Ok(offset) = other.as_float() {
                    if offset <= TJ_SPACE_THRESHOLD && !text.ends_with(' ') {
                        text.push(' ');
                    }
                }
            }
        }
    }
    text
}

/// UTF-16BE when the bytes carry a BOM, UTF-8 when valid, Latin-1 otherwise.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
