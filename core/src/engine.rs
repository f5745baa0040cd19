//! Query pipeline: terms → candidate set → scored set → ranked list.

use crate::config::RankingConfig;
use crate::error::Result;
use crate::index::InvertedIndex;
use crate::merge::{difference, intersect_all, union_all};
use crate::ranking::Bm25;
use crate::store::{Passage, PassageStore};
use crate::DocId;
use serde::Serialize;
use std::collections::HashSet;

/// How query terms combine into the candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// OR: a passage needs one query term.
    #[default]
    Any,
    /// AND: a passage needs every query term.
    All,
}

/// Normalized query terms, in order. Repeats are kept, they affect scoring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    terms: Vec<String>,
    mode: MatchMode,
    excluded: Vec<String>,
}

impl Query {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { terms: terms.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Drop passages containing any of these terms from the candidates.
    pub fn excluding<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(terms.into_iter().map(Into::into));
        self
    }

    pub fn terms(&self) -> &[String] { &self.terms }

    pub fn mode(&self) -> MatchMode { self.mode }

    pub fn excluded(&self) -> &[String] { &self.excluded }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredPassage {
    pub doc_id: DocId,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EngineStats {
    pub num_passages: usize,
    pub num_terms: usize,
    pub average_length: Option<f64>,
}

/// Immutable store + index pair. Safe to share across threads once built.
#[derive(Debug)]
pub struct SearchEngine {
    store: PassageStore,
    index: InvertedIndex,
    config: RankingConfig,
}

impl SearchEngine {
    /// Ends the build phase: takes ownership of the filled store and builds
    /// the postings from it.
    pub fn build(store: PassageStore, config: RankingConfig) -> Result<Self> {
        config.validate()?;
        let index = InvertedIndex::build(&store);
        tracing::info!(passages = store.len(), terms = index.num_terms(), "search engine ready");
        Ok(Self { store, index, config })
    }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn passage(&self, doc_id: DocId) -> Result<&Passage> {
        self.store.get_passage(doc_id)
    }

    /// Merge the postings of the distinct `terms`.
    pub fn candidates<S: AsRef<str>>(&self, terms: &[S], mode: MatchMode) -> Vec<DocId> {
        let mut seen: HashSet<&str> = HashSet::new();
        let lists = terms
            .iter()
            .map(|t| t.as_ref())
            .filter(|t| seen.insert(*t))
            .map(|t| self.index.postings(t));
        match mode {
            MatchMode::Any => union_all(lists),
            MatchMode::All => intersect_all(lists),
        }
    }

    /// Remove every passage containing one of `terms`.
    pub fn exclude<S: AsRef<str>>(&self, candidates: &[DocId], terms: &[S]) -> Vec<DocId> {
        if terms.is_empty() {
            return candidates.to_vec();
        }
        let excluded = self.candidates(terms, MatchMode::Any);
        difference(candidates, &excluded)
    }

    /// Rank every candidate by descending score; equal scores keep
    /// ascending doc id order.
    pub fn search(&self, query: &Query) -> Result<Vec<ScoredPassage>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let bm25 = Bm25::new(&self.store, &self.index, self.config)?;

        let mut candidates = self.candidates(query.terms(), query.mode());
        if !query.excluded().is_empty() {
            candidates = self.exclude(&candidates, query.excluded());
        }

        let mut ranked = candidates
            .into_iter()
            .map(|doc_id| -> Result<ScoredPassage> {
                let passage = self.store.get_passage(doc_id)?;
                Ok(ScoredPassage { doc_id, score: bm25.score(passage, query.terms()) })
            })
            .collect::<Result<Vec<_>>>()?;
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));
        tracing::debug!(terms = query.terms().len(), hits = ranked.len(), "query ranked");
        Ok(ranked)
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            num_passages: self.store.len(),
            num_terms: self.index.num_terms(),
            average_length: self.store.average_length().ok(),
        }
    }
}
