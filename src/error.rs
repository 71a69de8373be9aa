//! Error handling utilities shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::TokenId;

/// Convenient result type used throughout the crate.
pub type Result<T, E = BpeError> = std::result::Result<T, E>;

/// Domain-specific error describing failures during training, persistence, or decoding.
#[derive(Debug, Error)]
pub enum BpeError {
    /// Training configuration or segmentation pattern failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Pair statistics ran dry before the requested number of merges was learned.
    #[error(
        "training input exhausted after {completed} of {requested} merges; \
         no adjacent pairs remain"
    )]
    Exhausted {
        /// Merges that were learned before the statistics became empty.
        completed: usize,
        /// Merges implied by the requested vocabulary size.
        requested: usize,
    },
    /// Persisted model content is not a well-formed ordered list of pairs.
    #[error("malformed model file: {0}")]
    Format(String),
    /// Token id does not exist in the vocabulary.
    #[error("token id {id} exceeds vocab size {vocab_size}")]
    UnknownToken {
        /// Offending token id.
        id: TokenId,
        /// Vocabulary size at the time of the lookup.
        vocab_size: usize,
    },
    /// Filesystem IO error with optional context path.
    #[error("io error while processing {path:?}: {source}")]
    Io {
        /// Underlying IO error returned by the standard library.
        source: std::io::Error,
        /// Target path associated with the IO failure if available.
        path: Option<PathBuf>,
    },
}

impl From<serde_json::Error> for BpeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.to_string())
    }
}

impl From<fancy_regex::Error> for BpeError {
    fn from(err: fancy_regex::Error) -> Self {
        Self::InvalidConfig(format!("invalid split pattern: {err}"))
    }
}

impl BpeError {
    /// Helper constructor that attaches an optional path when wrapping IO errors.
    pub fn io(source: std::io::Error, path: Option<PathBuf>) -> Self {
        Self::Io { source, path }
    }
}
