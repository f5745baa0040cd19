//! On-disk corpus layout used for ingestion and for displaying results.
//!
//! A corpus is two parallel directories holding files with the same names:
//! the normalized one (whitespace separated terms) feeds the passage store,
//! the original one is only read back to show a ranked passage. Inside each
//! file, passages are separated by `$$$`. Files are units, ordered by name.

use crate::error::{Result, SearchError};
use crate::store::{term_frequencies, DocIdLayout, PassageStore};
use crate::DocId;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const PASSAGE_SEPARATOR: &str = "$$$";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassageContent {
    /// File name of the unit the passage came from.
    pub source_label: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct CorpusDir {
    normalized_root: PathBuf,
    original_root: PathBuf,
    units: Vec<String>,
    layout: DocIdLayout,
}

impl CorpusDir {
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(normalized: P, original: Q, layout: DocIdLayout) -> Result<Self> {
        let normalized_root = normalized.as_ref().to_path_buf();
        let mut units = Vec::new();
        for entry in WalkDir::new(&normalized_root).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| SearchError::io(&normalized_root, e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) => units.push(name.to_string()),
                None => tracing::warn!(path = %entry.path().display(), "skipping unit with non UTF-8 name"),
            }
        }
        Ok(Self { normalized_root, original_root: original.as_ref().to_path_buf(), units, layout })
    }

    pub fn units(&self) -> &[String] { &self.units }

    /// Feed every passage of every unit into `store`, in ascending id order.
    /// Returns the number of passages added.
    pub fn load(&self, store: &mut PassageStore) -> Result<usize> {
        let mut added = 0usize;
        for (unit, name) in self.units.iter().enumerate() {
            let unit = u32::try_from(unit)
                .map_err(|_| SearchError::InvalidInput(format!("too many units in {}", self.normalized_root.display())))?;
            let path = self.normalized_root.join(name);
            let text = fs::read_to_string(&path).map_err(|e| SearchError::io(&path, e))?;
            for (ordinal, passage) in text.split(PASSAGE_SEPARATOR).enumerate() {
                let ordinal = u32::try_from(ordinal).unwrap_or(u32::MAX);
                let doc_id = self.layout.doc_id(unit, ordinal)?;
                store.insert_passage(doc_id, term_frequencies(passage.split_whitespace()))?;
                added += 1;
            }
            tracing::debug!(unit, file = %name, "unit ingested");
        }
        tracing::info!(units = self.units.len(), passages = added, "corpus loaded");
        Ok(added)
    }

    pub fn source_label(&self, doc_id: DocId) -> Result<&str> {
        let (unit, _) = self.layout.split(doc_id);
        self.units.get(unit as usize).map(String::as_str).ok_or(SearchError::NotFound(doc_id))
    }

    /// Original text of a passage, read from the original directory.
    pub fn content(&self, doc_id: DocId) -> Result<PassageContent> {
        let (_, ordinal) = self.layout.split(doc_id);
        let source_label = self.source_label(doc_id)?.to_string();
        let path = self.original_root.join(&source_label);
        let text = fs::read_to_string(&path).map_err(|e| SearchError::io(&path, e))?;
        let passage = text.split(PASSAGE_SEPARATOR).nth(ordinal as usize).ok_or(SearchError::NotFound(doc_id))?;
        Ok(PassageContent { source_label, text: passage.to_string() })
    }
}
