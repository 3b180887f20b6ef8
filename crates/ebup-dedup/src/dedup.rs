//! Single-pass blank and duplicate filtering over ordered content units.

use crate::blank::{DEFAULT_BLANK_MIN_CHARS, is_blank_with};
use crate::fingerprint::{Fingerprint, fingerprint};
use crate::similarity::{
    DEFAULT_SIMILARITY_THRESHOLD, IndelRatio, LengthPrefilter, SimilarityScorer, match_score,
};
use crate::unit::ContentUnit;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct DedupConfig {
    pub blank_min_chars: usize,
    pub similarity_threshold: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            blank_min_chars: DEFAULT_BLANK_MIN_CHARS,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// Classification of one input unit. `of` is the survivor position the unit
/// duplicated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    Kept,
    Blank,
    ExactDuplicate { of: usize },
    FuzzyDuplicate { of: usize, score: f64 },
}

impl Verdict {
    pub fn is_removed(&self) -> bool {
        !matches!(self, Verdict::Kept)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DedupEvent {
    pub index: usize,
    pub title: String,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    pub survivors: Vec<ContentUnit>,
    pub events: Vec<DedupEvent>,
    pub blanks_removed: usize,
    pub duplicates_removed: usize,
}

/// Per-invocation memory of what has been kept so far.
#[derive(Default)]
struct DedupState {
    seen_fingerprints: HashMap<Fingerprint, usize>,
    seen_texts: Vec<String>,
}

impl DedupState {
    fn keep(&mut self, print: Fingerprint, text: &str) {
        self.seen_fingerprints.insert(print, self.seen_texts.len());
        self.seen_texts.push(text.to_string());
        debug_assert_eq!(self.seen_fingerprints.len(), self.seen_texts.len());
    }
}

pub struct Deduplicator<S = LengthPrefilter<IndelRatio>> {
    config: DedupConfig,
    scorer: S,
}

impl Deduplicator {
    /// InDel scoring behind a length prefilter tuned to the threshold.
    pub fn new(config: DedupConfig) -> Self {
        let scorer = LengthPrefilter::new(IndelRatio, config.similarity_threshold);
        Self { config, scorer }
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DedupConfig::default())
    }
}

impl<S: SimilarityScorer> Deduplicator<S> {
    pub fn with_scorer(config: DedupConfig, scorer: S) -> Self {
        Self { config, scorer }
    }

    /// Keep the first occurrence of each distinct unit, in input order.
    ///
    /// Blank units are dropped before any comparison. Exact fingerprint hits
    /// short-circuit the fuzzy scan; the fuzzy scan checks every survivor so
    /// far and stops at the first match.
    pub fn deduplicate(&self, units: Vec<ContentUnit>) -> DedupOutcome {
        if units.is_empty() {
            return DedupOutcome::default();
        }

        let mut state = DedupState::default();
        let mut outcome = DedupOutcome {
            survivors: Vec::with_capacity(units.len()),
            events: Vec::with_capacity(units.len()),
            ..DedupOutcome::default()
        };

        for (index, unit) in units.into_iter().enumerate() {
            let verdict = self.classify(&mut state, &unit);
            trace!(index, title = unit.title(), ?verdict, "Classified content unit");

            match verdict {
                Verdict::Kept => {}
                Verdict::Blank => outcome.blanks_removed += 1,
                Verdict::ExactDuplicate { .. } | Verdict::FuzzyDuplicate { .. } => {
                    outcome.duplicates_removed += 1
                }
            }
            outcome.events.push(DedupEvent {
                index,
                title: unit.title().to_string(),
                verdict,
            });
            if !verdict.is_removed() {
                outcome.survivors.push(unit);
            }
        }

        debug!(
            kept = outcome.survivors.len(),
            blanks = outcome.blanks_removed,
            duplicates = outcome.duplicates_removed,
            "Deduplication finished"
        );
        outcome
    }

    fn classify(&self, state: &mut DedupState, unit: &ContentUnit) -> Verdict {
        let text = unit.plain_text();
        if is_blank_with(text, self.config.blank_min_chars) {
            return Verdict::Blank;
        }

        let print = fingerprint(text);
        if let Some(&of) = state.seen_fingerprints.get(&print) {
            trace!(fingerprint = %print, of, "Fingerprint already seen");
            return Verdict::ExactDuplicate { of };
        }

        let threshold = self.config.similarity_threshold;
        for (of, seen) in state.seen_texts.iter().enumerate() {
            if let Some(score) = match_score(&self.scorer, text, seen, threshold) {
                return Verdict::FuzzyDuplicate { of, score };
            }
        }

        state.keep(print, text);
        Verdict::Kept
    }
}
