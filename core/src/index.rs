use crate::store::PassageStore;
use crate::DocId;
use std::collections::HashMap;

/// Term → ascending, duplicate-free list of passage ids containing the term.
///
/// Built once from a fully populated [`PassageStore`]; there is no
/// incremental update, a grown store needs a fresh build.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, Vec<DocId>>,
    num_docs: usize,
}

impl InvertedIndex {
    /// Single pass over the store. Passages are visited in ascending id
    /// order, so every postings list comes out sorted without a sort step.
    pub fn build(store: &PassageStore) -> Self {
        let mut postings: HashMap<String, Vec<DocId>> = HashMap::new();
        for passage in store.passages() {
            for term in passage.term_frequency.keys() {
                postings.entry(term.clone()).or_default().push(passage.doc_id);
            }
        }
        tracing::debug!(num_docs = store.len(), num_terms = postings.len(), "built inverted index");
        Self { postings, num_docs: store.len() }
    }

    /// Postings for `term`; an unknown term yields an empty list.
    pub fn postings(&self, term: &str) -> &[DocId] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings(term).len()
    }

    pub fn contains(&self, term: &str) -> bool { self.postings.contains_key(term) }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    pub fn num_docs(&self) -> usize { self.num_docs }

    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }
}
