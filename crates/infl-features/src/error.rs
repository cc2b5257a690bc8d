use std::path::PathBuf;

use infl_core::SourceError;
use thiserror::Error;

/// Errors from extracting or assembling one user's features.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Fewer valid engagement samples than the assembler requires.
    #[error("insufficient data for {username}: {samples} engagement samples, need {required}")]
    InsufficientData {
        username: String,
        samples: usize,
        required: usize,
    },

    /// A vector slot has no value, e.g. colour clustering never converged.
    #[error("missing feature: {0}")]
    MissingFeature(&'static str),
}

impl FeatureError {
    /// `true` when the account itself is gone or private, as opposed to a
    /// failure that a later run might get past.
    #[must_use]
    pub fn is_user_unavailable(&self) -> bool {
        matches!(self, FeatureError::Source(e) if e.is_fatal_for_user())
    }
}

/// Errors from loading, building, or persisting the word frequency model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model artifact {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported model version {found} in {} (expected {expected})", path.display())]
    Version {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("checksum mismatch in {}: artifact is corrupt", path.display())]
    Checksum { path: PathBuf },

    /// Building from the corpus failed before anything was written.
    #[error("corpus unavailable: {0}")]
    Corpus(#[from] SourceError),
}

/// Errors from the persisted feature cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed feature cache {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
