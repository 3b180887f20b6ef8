//! Content deduplication and page classification for e-book content units.
//!
//! The pieces are layered leaf-first:
//! - `text` canonicalizes raw text for comparison.
//! - `blank` decides whether a unit carries any meaningful content.
//! - `fingerprint` digests normalized text for exact-match detection.
//! - `similarity` scores two texts for near-duplication.
//! - `dedup` runs the single forward pass that combines all of the above.
//!
//! Nothing here touches the filesystem; extraction and container assembly live
//! in the binary crate.

pub mod blank;
pub mod dedup;
pub mod fingerprint;
pub mod similarity;
pub mod text;
pub mod unit;

pub use blank::{DEFAULT_BLANK_MIN_CHARS, is_blank, is_blank_with};
pub use dedup::{DedupConfig, DedupEvent, DedupOutcome, Deduplicator, Verdict};
pub use fingerprint::{Fingerprint, fingerprint};
pub use similarity::{
    DEFAULT_SIMILARITY_THRESHOLD, IndelRatio, LengthPrefilter, LevenshteinRatio, SimilarityScorer,
    match_score, similar, similar_with,
};
pub use text::normalize;
pub use unit::ContentUnit;
