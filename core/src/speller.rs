//! Optional spelling correction, run by the caller before a [`crate::Query`]
//! is built. The engine itself never calls into this module.

use crate::index::InvertedIndex;
use std::cmp::min;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub terms: Vec<String>,
    pub corrected: bool,
}

pub trait SpellCorrector: Send + Sync {
    fn correct(&self, terms: &[String]) -> Correction;
}

/// Passes terms through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCorrection;

impl SpellCorrector for NoCorrection {
    fn correct(&self, terms: &[String]) -> Correction {
        Correction { terms: terms.to_vec(), corrected: false }
    }
}

/// Edit distance the binaries allow when correction is requested.
pub const DEFAULT_MAX_DISTANCE: usize = 2;

/// Terms shorter than this are never rewritten.
const MIN_TERM_CHARS: usize = 3;

/// Replaces out-of-vocabulary terms with the closest indexed term.
///
/// Ranking among candidates within `max_distance` edits: fewer edits first,
/// then higher document frequency, then lexicographic order.
#[derive(Debug, Clone)]
pub struct VocabularyCorrector {
    vocabulary: Vec<(String, usize)>,
    max_distance: usize,
}

impl VocabularyCorrector {
    pub fn new(index: &InvertedIndex, max_distance: usize) -> Self {
        let mut vocabulary: Vec<(String, usize)> =
            index.vocabulary().map(|t| (t.to_string(), index.document_frequency(t))).collect();
        vocabulary.sort();
        Self { vocabulary, max_distance }
    }

    fn known(&self, term: &str) -> bool {
        self.vocabulary.binary_search_by(|(t, _)| t.as_str().cmp(term)).is_ok()
    }

    fn suggest(&self, term: &str) -> Option<&str> {
        self.vocabulary
            .iter()
            .filter_map(|(t, df)| bounded_levenshtein(term, t, self.max_distance).map(|d| (d, *df, t.as_str())))
            .min_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)).then(a.2.cmp(b.2)))
            .map(|(_, _, t)| t)
    }
}

impl SpellCorrector for VocabularyCorrector {
    fn correct(&self, terms: &[String]) -> Correction {
        let mut corrected = false;
        let terms = terms
            .iter()
            .map(|term| {
                if self.known(term) || term.chars().count() < MIN_TERM_CHARS {
                    return term.clone();
                }
                match self.suggest(term) {
                    Some(s) => {
                        tracing::debug!(from = %term, to = s, "spelling corrected");
                        corrected = true;
                        s.to_string()
                    }
                    None => term.clone(),
                }
            })
            .collect();
        Correction { terms, corrected }
    }
}

/// Edit distance between `a` and `b`, or `None` once it exceeds `limit`.
fn bounded_levenshtein(a: &str, b: &str, limit: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > limit {
        return None;
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for i in 1..=a.len() {
        curr[0] = i;
        let mut row_min = curr[0];
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = min(min(prev[j] + 1, curr[j - 1] + 1), prev[j - 1] + cost);
            row_min = row_min.min(curr[j]);
        }
        if row_min > limit {
            return None;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    let distance = prev[b.len()];
    (distance <= limit).then_some(distance)
}
