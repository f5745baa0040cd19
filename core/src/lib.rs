//! In-memory passage retrieval: postings lists, boolean merges and BM25 ranking.

pub mod config;
pub mod corpus_dir;
pub mod engine;
pub mod error;
pub mod index;
pub mod merge;
pub mod ranking;
pub mod speller;
pub mod store;
pub mod tokenizer;

pub type DocId = u32;

pub use config::{EngineConfig, RankingConfig, RepeatedTerms};
pub use engine::{EngineStats, MatchMode, Query, ScoredPassage, SearchEngine};
pub use error::{Result, SearchError};
pub use index::InvertedIndex;
pub use ranking::Bm25;
pub use store::{DocIdLayout, Passage, PassageStore};
