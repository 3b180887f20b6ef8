//! Output metadata resolution.

use crate::config::MetadataConfig;
use crate::engine::{BookMetadata, SourceMetadata};
use chrono::Local;
use std::path::Path;
use uuid::Uuid;

/// Fill every field the source left empty. The identifier and date are always
/// fresh for this run.
pub fn resolve_metadata(
    source: SourceMetadata,
    fallback_title: &str,
    defaults: &MetadataConfig,
) -> BookMetadata {
    BookMetadata {
        identifier: format!("urn:uuid:{}", Uuid::new_v4()),
        title: source
            .title
            .unwrap_or_else(|| fallback_title.to_string()),
        author: source
            .author
            .unwrap_or_else(|| defaults.unknown_author.clone()),
        language: source
            .language
            .unwrap_or_else(|| defaults.language.clone()),
        publisher: source
            .publisher
            .unwrap_or_else(|| defaults.publisher.clone()),
        date: Local::now().format("%Y-%m-%d").to_string(),
    }
}

/// File name without its extension, used as a title of last resort.
pub fn file_stem_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.trim().is_empty())
        .unwrap_or_else(|| "Untitled".to_string())
}
