//! Corpus-derived token rarity model and its on-disk artifact.
//!
//! The model maps each normalized token to its accumulated fractional
//! frequency over the whole comment corpus. It is built in one pass, written
//! once, and never updated in place: a missing artifact triggers a full
//! rebuild, a corrupt one is an error.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ModelError;
use crate::persist::write_atomic;
use crate::tokenize::tokenize;

/// Artifact format version. Bump when the entry semantics change.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Token -> accumulated fractional frequency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordModel {
    entries: BTreeMap<String, f64>,
}

impl WordModel {
    /// Builds the model from every comment text in `corpus`.
    ///
    /// Each distinct retained token of a comment adds `1 / total_tokens`
    /// once, however often it repeats. The denominator counts every token,
    /// discarded ones included.
    pub fn build<I, S>(corpus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: BTreeMap<String, f64> = BTreeMap::new();
        for text in corpus {
            let tokens = tokenize(text.as_ref());
            if tokens.total == 0 {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let share = 1.0 / tokens.total as f64;
            let distinct: BTreeSet<String> = tokens.retained.into_iter().collect();
            for token in distinct {
                *entries.entry(token).or_insert(0.0) += share;
            }
        }
        Self { entries }
    }

    /// Frequency of `token`, `0.0` if unseen.
    #[must_use]
    pub fn frequency(&self, token: &str) -> f64 {
        self.entries.get(token).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn checksum(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(&self.entries)?;
        let digest = Sha256::digest(&bytes);
        Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
    }
}

impl FromIterator<(String, f64)> for WordModel {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ModelArtifact {
    version: u32,
    checksum: String,
    entries: WordModel,
}

/// Loads and persists the [`WordModel`] at a fixed path.
#[derive(Debug, Clone)]
pub struct WordModelStore {
    path: PathBuf,
}

impl WordModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads the artifact. `Ok(None)` when no artifact exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] on I/O failure, malformed JSON, an unsupported
    /// version, or a checksum mismatch.
    pub fn load(&self) -> Result<Option<WordModel>, ModelError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ModelError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let artifact: ModelArtifact =
            serde_json::from_slice(&bytes).map_err(|source| self.json_error(source))?;
        if artifact.version != MODEL_FORMAT_VERSION {
            return Err(ModelError::Version {
                path: self.path.clone(),
                found: artifact.version,
                expected: MODEL_FORMAT_VERSION,
            });
        }
        let checksum = artifact
            .entries
            .checksum()
            .map_err(|source| self.json_error(source))?;
        if checksum != artifact.checksum {
            return Err(ModelError::Checksum {
                path: self.path.clone(),
            });
        }
        Ok(Some(artifact.entries))
    }

    /// Writes the artifact atomically.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Io`] if the file cannot be written.
    pub fn save(&self, model: &WordModel) -> Result<(), ModelError> {
        let artifact = ModelArtifact {
            version: MODEL_FORMAT_VERSION,
            checksum: model.checksum().map_err(|source| self.json_error(source))?,
            entries: model.clone(),
        };
        let bytes = serde_json::to_vec(&artifact).map_err(|source| self.json_error(source))?;
        write_atomic(&self.path, &bytes).map_err(|source| ModelError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(path = %self.path.display(), tokens = model.len(), "saved word model");
        Ok(())
    }

    /// Returns the persisted model, or builds it from `corpus` and saves it
    /// when no artifact exists. The corpus is only read on a rebuild.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the artifact is corrupt, the corpus cannot
    /// be read, or the new artifact cannot be written.
    pub async fn load_or_build<F, Fut, E>(&self, corpus: F) -> Result<WordModel, ModelError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<String>, E>>,
        ModelError: From<E>,
    {
        if let Some(model) = self.load()? {
            tracing::debug!(path = %self.path.display(), tokens = model.len(), "loaded word model");
            return Ok(model);
        }
        tracing::info!(path = %self.path.display(), "word model not found, building from corpus");
        let texts = corpus().await?;
        let model = WordModel::build(&texts);
        self.save(&model)?;
        Ok(model)
    }

    /// Builds from `corpus` and overwrites any existing artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Io`] if the artifact cannot be written.
    pub fn rebuild<I, S>(&self, corpus: I) -> Result<WordModel, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let model = WordModel::build(corpus);
        self.save(&model)?;
        Ok(model)
    }

    fn json_error(&self, source: serde_json::Error) -> ModelError {
        ModelError::Json {
            path: self.path.clone(),
            source,
        }
    }
}
