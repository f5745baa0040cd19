//! Append-only passage storage.
//!
//! The store is filled during the build phase by a single writer and then
//! moved into a [`crate::SearchEngine`], after which it is only read.

use crate::error::{Result, SearchError};
use crate::DocId;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct Passage {
    pub doc_id: DocId,
    pub term_frequency: HashMap<String, u32>,
    /// Sum of all frequencies, i.e. the passage length in tokens.
    pub term_count: u32,
}

impl Passage {
    fn new(doc_id: DocId, term_frequency: HashMap<String, u32>) -> Self {
        let term_count = term_frequency.values().sum();
        Self { doc_id, term_frequency, term_count }
    }

    pub fn tf(&self, term: &str) -> u32 {
        self.term_frequency.get(term).copied().unwrap_or(0)
    }
}

/// Count occurrences of each term in an already normalized token stream.
pub fn term_frequencies<I, S>(terms: I) -> HashMap<String, u32>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut counts: HashMap<String, u32> = HashMap::new();
    for term in terms {
        *counts.entry(term.into()).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Default)]
pub struct PassageStore {
    passages: BTreeMap<DocId, Passage>,
    average_length: f64,
}

impl PassageStore {
    pub fn new() -> Self { Self::default() }

    /// Append a passage under the next sequential id and return that id.
    pub fn add_passage(&mut self, term_frequency: HashMap<String, u32>) -> Result<DocId> {
        let doc_id = match self.last_doc_id() {
            None => 0,
            Some(last) => last
                .checked_add(1)
                .ok_or_else(|| SearchError::InvalidInput("doc id space exhausted".into()))?,
        };
        self.push(Passage::new(doc_id, term_frequency));
        Ok(doc_id)
    }

    /// Append a passage under a caller-assigned id. Ids must arrive in
    /// strictly ascending order.
    pub fn insert_passage(&mut self, doc_id: DocId, term_frequency: HashMap<String, u32>) -> Result<()> {
        if let Some(last) = self.last_doc_id() {
            if doc_id <= last {
                return Err(SearchError::InvalidInput(format!(
                    "doc id {doc_id} is not greater than the last stored id {last}"
                )));
            }
        }
        self.push(Passage::new(doc_id, term_frequency));
        Ok(())
    }

    fn push(&mut self, passage: Passage) {
        let n = self.passages.len() as f64;
        self.average_length = (self.average_length * n + passage.term_count as f64) / (n + 1.0);
        self.passages.insert(passage.doc_id, passage);
    }

    pub fn get_passage(&self, doc_id: DocId) -> Result<&Passage> {
        self.passages.get(&doc_id).ok_or(SearchError::NotFound(doc_id))
    }

    /// Mean passage length over the whole collection.
    pub fn average_length(&self) -> Result<f64> {
        if self.passages.is_empty() {
            return Err(SearchError::EmptyCorpus);
        }
        Ok(self.average_length)
    }

    /// Passages in ascending id order.
    pub fn passages(&self) -> impl Iterator<Item = &Passage> {
        self.passages.values()
    }

    pub fn len(&self) -> usize { self.passages.len() }

    pub fn is_empty(&self) -> bool { self.passages.is_empty() }

    fn last_doc_id(&self) -> Option<DocId> {
        self.passages.keys().next_back().copied()
    }
}

/// Flat id layout for passages grouped by source unit:
/// `doc_id = unit * passages_per_unit + ordinal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocIdLayout {
    passages_per_unit: u32,
}

impl DocIdLayout {
    pub fn new(passages_per_unit: u32) -> Result<Self> {
        if passages_per_unit == 0 {
            return Err(SearchError::InvalidConfig("passages_per_unit must be at least 1".into()));
        }
        Ok(Self { passages_per_unit })
    }

    pub fn doc_id(&self, unit: u32, ordinal: u32) -> Result<DocId> {
        if ordinal >= self.passages_per_unit {
            return Err(SearchError::CapacityExceeded { unit, ordinal, capacity: self.passages_per_unit });
        }
        unit.checked_mul(self.passages_per_unit)
            .and_then(|base| base.checked_add(ordinal))
            .ok_or_else(|| SearchError::InvalidInput(format!("doc id for unit {unit} overflows u32")))
    }

    /// Inverse of [`DocIdLayout::doc_id`]: `(unit, ordinal)`.
    pub fn split(&self, doc_id: DocId) -> (u32, u32) {
        (doc_id / self.passages_per_unit, doc_id % self.passages_per_unit)
    }
}
