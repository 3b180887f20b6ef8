//! Near-duplicate scoring.
//!
//! Scores live on a 0–100 scale. The comparison runs on raw text rather than
//! the normalized projection so that OCR noise and line-break drift are judged
//! fuzzily instead of hashed away.

use std::collections::HashMap;
use strsim::normalized_levenshtein;

/// Two texts scoring at or above this ratio are treated as the same content.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 95.0;

/// Pluggable similarity cost function.
pub trait SimilarityScorer {
    /// Similarity of `a` and `b` on a 0–100 scale.
    fn score(&self, a: &str, b: &str) -> f64;
}

/// InDel ratio: `100 * (1 - indel / (len_a + len_b))`, where `indel` counts
/// the insertions and deletions needed to turn one text into the other.
///
/// Equivalent to `200 * lcs / (len_a + len_b)`. Lengths are in Unicode scalar
/// values. A substitution costs two edits here, so appended footers and page
/// numbers weigh less than under Levenshtein.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndelRatio;

impl SimilarityScorer for IndelRatio {
    fn score(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let total = a.len() + b.len();
        if total == 0 {
            return 100.0;
        }
        let (pattern, text) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
        100.0 * (2 * lcs_len(pattern, text)) as f64 / total as f64
    }
}

/// Longest common subsequence length, bit-parallel over `pattern`
/// (Hyyrö's formulation, one bit per pattern position).
fn lcs_len(pattern: &[char], text: &[char]) -> usize {
    if pattern.is_empty() || text.is_empty() {
        return 0;
    }
    let words = pattern.len().div_ceil(64);
    let mut masks: HashMap<char, Vec<u64>> = HashMap::new();
    for (pos, ch) in pattern.iter().enumerate() {
        masks.entry(*ch).or_insert_with(|| vec![0; words])[pos / 64] |= 1 << (pos % 64);
    }

    let mut row = vec![u64::MAX; words];
    for ch in text {
        let Some(mask) = masks.get(ch) else {
            continue;
        };
        let mut carry = false;
        for (word, &bits) in row.iter_mut().zip(mask) {
            let matched = *word & bits;
            let (sum, c1) = word.overflowing_add(matched);
            let (sum, c2) = sum.overflowing_add(carry as u64);
            carry = c1 || c2;
            *word = sum | (*word - matched);
        }
    }

    let tail_bits = pattern.len() % 64;
    row.iter()
        .enumerate()
        .map(|(idx, word)| {
            let valid = if idx == words - 1 && tail_bits != 0 {
                (1u64 << tail_bits) - 1
            } else {
                u64::MAX
            };
            (!word & valid).count_ones() as usize
        })
        .sum()
}

/// Normalized Levenshtein ratio over Unicode scalar values.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenshteinRatio;

impl SimilarityScorer for LevenshteinRatio {
    fn score(&self, a: &str, b: &str) -> f64 {
        normalized_levenshtein(a, b) * 100.0
    }
}

/// Skips the inner scorer when the length difference alone rules a match out.
///
/// Any edit script needs at least `|la - lb|` insertions or deletions, so
/// `100 * (1 - |la - lb| / (la + lb))` bounds both ratios from above. When that
/// bound is already under `floor` it is returned as the score.
#[derive(Debug, Clone, Copy)]
pub struct LengthPrefilter<S> {
    inner: S,
    floor: f64,
}

impl<S> LengthPrefilter<S> {
    pub fn new(inner: S, floor: f64) -> Self {
        Self { inner, floor }
    }
}

impl<S: SimilarityScorer> SimilarityScorer for LengthPrefilter<S> {
    fn score(&self, a: &str, b: &str) -> f64 {
        let la = a.chars().count();
        let lb = b.chars().count();
        let total = la + lb;
        if total == 0 {
            return self.inner.score(a, b);
        }
        let bound = 100.0 * (1.0 - la.abs_diff(lb) as f64 / total as f64);
        if bound < self.floor {
            return bound;
        }
        self.inner.score(a, b)
    }
}

impl<S: SimilarityScorer + ?Sized> SimilarityScorer for &S {
    fn score(&self, a: &str, b: &str) -> f64 {
        (**self).score(a, b)
    }
}

impl<S: SimilarityScorer + ?Sized> SimilarityScorer for Box<S> {
    fn score(&self, a: &str, b: &str) -> f64 {
        (**self).score(a, b)
    }
}

/// InDel-ratio similarity check.
pub fn similar(a: &str, b: &str, threshold: f64) -> bool {
    similar_with(&IndelRatio, a, b, threshold)
}

/// Similarity check through an arbitrary scorer.
pub fn similar_with<S: SimilarityScorer + ?Sized>(
    scorer: &S,
    a: &str,
    b: &str,
    threshold: f64,
) -> bool {
    match_score(scorer, a, b, threshold).is_some()
}

/// The score of `a` against `b` when it reaches `threshold`.
///
/// Empty inputs are never similar to anything, which keeps two blank-ish units
/// from matching each other.
pub fn match_score<S: SimilarityScorer + ?Sized>(
    scorer: &S,
    a: &str,
    b: &str,
    threshold: f64,
) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let score = scorer.score(a, b);
    (score >= threshold).then_some(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Fixed(f64);

    impl SimilarityScorer for Fixed {
        fn score(&self, _a: &str, _b: &str) -> f64 {
            self.0
        }
    }

    struct Counting {
        calls: Cell<usize>,
    }

    impl SimilarityScorer for Counting {
        fn score(&self, a: &str, b: &str) -> f64 {
            self.calls.set(self.calls.get() + 1);
            IndelRatio.score(a, b)
        }
    }

    #[test]
    fn empty_side_is_never_similar() {
        assert!(!similar("", "anything", DEFAULT_SIMILARITY_THRESHOLD));
        assert!(!similar("anything", "", DEFAULT_SIMILARITY_THRESHOLD));
        assert!(!similar("", "", 0.0));
        assert!(!similar_with(&Fixed(100.0), "", "x", 0.0));
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(similar_with(&Fixed(95.0), "a", "b", 95.0));
        assert!(!similar_with(&Fixed(94.999), "a", "b", 95.0));
    }

    #[test]
    fn line_breaks_and_one_typo_score_ninety_seven() {
        let a = "The lighthouse keeper climbed the spiral stairs every evening to light the great lamp above the sea.";
        let b = "The lighthouse keeper climbed the spiral\nstairs every evening to light the great\nlamp above the sea.";
        let b = b.replace("evening", "evenlng");
        let score = IndelRatio.score(a, &b);
        assert!((score - 97.0).abs() < 1e-9, "unexpected score {score}");
        assert!(similar(a, &b, DEFAULT_SIMILARITY_THRESHOLD));
    }

    #[test]
    fn appended_page_number_stays_within_threshold() {
        let body = "The lighthouse keeper climbed the spiral stairs every evening to light the great lamp above.";
        let with_footer = format!("{body} Page 12");
        let indel = IndelRatio.score(body, &with_footer);
        assert!((indel - 95.833_333_333).abs() < 1e-6, "unexpected score {indel}");
        assert!(similar(body, &with_footer, DEFAULT_SIMILARITY_THRESHOLD));
        assert!(LevenshteinRatio.score(body, &with_footer) < DEFAULT_SIMILARITY_THRESHOLD);
    }

    #[test]
    fn indel_ratio_matches_known_values() {
        assert_eq!(IndelRatio.score("same", "same"), 100.0);
        assert_eq!(IndelRatio.score("abc", "xyz"), 0.0);
        // lcs("kitten", "sitting") = 4, lengths 6 + 7
        let score = IndelRatio.score("kitten", "sitting");
        assert!((score - 800.0 / 13.0).abs() < 1e-9, "unexpected score {score}");
        assert_eq!(IndelRatio.score("", ""), 100.0);
    }

    #[test]
    fn bit_parallel_lcs_spans_word_boundaries() {
        let pattern: Vec<char> = "ab".repeat(70).chars().collect();
        let text: Vec<char> = "b".repeat(70).chars().chain("a".repeat(10).chars()).collect();
        // every 'b' of the text matches in order, then one 'a' after the last 'b'
        assert_eq!(lcs_len(&pattern, &text), 70);
        let shifted: Vec<char> = "x".chars().chain(pattern.iter().copied()).collect();
        assert_eq!(lcs_len(&pattern, &shifted), 140);
    }

    #[test]
    fn unrelated_passages_are_not_similar() {
        assert!(!similar(
            "Hello world, this is chapter one.",
            "A completely different unrelated passage about something else entirely.",
            DEFAULT_SIMILARITY_THRESHOLD,
        ));
    }

    #[test]
    fn prefilter_skips_inner_scorer_on_length_mismatch() {
        let inner = Counting {
            calls: Cell::new(0),
        };
        let filtered = LengthPrefilter::new(&inner, DEFAULT_SIMILARITY_THRESHOLD);

        let short = "A short line of text.";
        let long = "A short line of text, followed by a good deal more material.";
        assert!(!similar_with(&filtered, short, long, DEFAULT_SIMILARITY_THRESHOLD));
        assert_eq!(inner.calls.get(), 0);

        let near = "A short line of text!";
        assert!(similar_with(&filtered, short, near, DEFAULT_SIMILARITY_THRESHOLD));
        assert_eq!(inner.calls.get(), 1);
    }

    #[test]
    fn prefilter_bound_never_undercuts_true_ratio() {
        let pairs = [
            ("abcdefghij", "abcdefghijk"),
            ("kitten", "sitting"),
            ("same", "same"),
            ("héllo wörld", "hello world!!"),
        ];
        let indel = LengthPrefilter::new(IndelRatio, 100.0);
        let levenshtein = LengthPrefilter::new(LevenshteinRatio, 100.0);
        for (a, b) in pairs {
            assert!(
                indel.score(a, b) >= IndelRatio.score(a, b) - 1e-9,
                "bound fell below indel ratio for {a:?} / {b:?}"
            );
            assert!(
                levenshtein.score(a, b) >= LevenshteinRatio.score(a, b) - 1e-9,
                "bound fell below levenshtein ratio for {a:?} / {b:?}"
            );
        }
    }
}
