//! Error taxonomy for the extraction pipeline
//!
//! Directory and record errors are recoverable: the walker and extractor hand
//! them back as values so the dataset builder can count them in the run
//! summary. Only strict mode turns a [`DirectoryAccessError`] into a failure,
//! wrapped in a [`BuildError`].

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A corpus directory level is missing or unreadable
#[derive(Error, Debug)]
#[error("cannot read directory {path:?}: {source}")]
pub struct DirectoryAccessError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl DirectoryAccessError {
    pub fn new(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

/// Why a dataset build stopped before the end of the corpus
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Directory(#[from] DirectoryAccessError),

    #[error("interrupted by user")]
    Interrupted,
}

/// A quarter file whose contents or coordinates do not match the report shape
#[derive(Error, Debug)]
pub enum RecordSchemaError {
    #[error("failed to read file: {0}")]
    Read(#[from] io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing key `{0}`")]
    MissingKey(&'static str),

    #[error("`{field}` has the wrong type (expected {expected})")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("category `{0}` has no payment instruments")]
    EmptyInstruments(String),

    #[error("category `{category}` has a count of {count}, above the storable maximum")]
    InvalidCount { category: String, count: u64 },

    #[error("category `{category}` has an invalid amount {amount}")]
    InvalidAmount { category: String, amount: f64 },

    #[error("year directory `{0}` is not a four-digit year")]
    InvalidYear(String),

    #[error("file name `{0}` is not a quarter number between 1 and 4")]
    InvalidQuarter(String),
}
