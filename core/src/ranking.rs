//! BM25 relevance scoring.
//!
//! `idf(t) = ln((N + 1) / (df + 0.5))`, which stays defined for `df = 0` and
//! `df = N`. It is never clamped.

use crate::config::{RankingConfig, RepeatedTerms};
use crate::error::{Result, SearchError};
use crate::index::InvertedIndex;
use crate::store::{Passage, PassageStore};
use std::collections::HashSet;

/// Scorer bound to one built collection. Construction fails with
/// `EmptyCorpus` when there is nothing to normalize lengths against,
/// including a collection made only of empty passages.
#[derive(Debug, Clone, Copy)]
pub struct Bm25<'a> {
    index: &'a InvertedIndex,
    config: RankingConfig,
    num_docs: f64,
    average_length: f64,
}

impl<'a> Bm25<'a> {
    pub fn new(store: &'a PassageStore, index: &'a InvertedIndex, config: RankingConfig) -> Result<Self> {
        let average_length = store.average_length()?;
        if average_length <= 0.0 {
            return Err(SearchError::EmptyCorpus);
        }
        Ok(Self { index, config, num_docs: store.len() as f64, average_length })
    }

    pub fn idf(&self, term: &str) -> f64 {
        let df = self.index.document_frequency(term) as f64;
        ((self.num_docs + 1.0) / (df + 0.5)).ln()
    }

    /// Contribution of a single query term; zero when the passage lacks it.
    pub fn term_score(&self, passage: &Passage, term: &str) -> f64 {
        let tf = passage.tf(term);
        if tf == 0 {
            return 0.0;
        }
        let tf = tf as f64;
        let RankingConfig { k1, b, .. } = self.config;
        let length_ratio = passage.term_count as f64 / self.average_length;
        self.idf(term) * tf * (k1 + 1.0) / (tf + k1 * (1.0 - b + b * length_ratio))
    }

    pub fn score<S: AsRef<str>>(&self, passage: &Passage, terms: &[S]) -> f64 {
        match self.config.repeated_terms {
            RepeatedTerms::PerOccurrence => terms.iter().map(|t| self.term_score(passage, t.as_ref())).sum(),
            RepeatedTerms::Distinct => {
                let mut seen: HashSet<&str> = HashSet::new();
                terms
                    .iter()
                    .map(|t| t.as_ref())
                    .filter(|t| seen.insert(*t))
                    .map(|t| self.term_score(passage, t))
                    .sum()
            }
        }
    }
}
