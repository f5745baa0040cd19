use crate::DocId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("passage {0} not found")]
    NotFound(DocId),

    #[error("corpus is empty: average passage length is undefined")]
    EmptyCorpus,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unit {unit} has passage #{ordinal}, capacity is {capacity} passages per unit")]
    CapacityExceeded { unit: u32, ordinal: u32, capacity: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SearchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SearchError::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
