//! Persisted per-user feature records, keyed by username.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::CacheError;
use crate::persist::write_atomic;
use crate::types::{FeatureVector, UserFeatures};

/// One exported row: who, their label, and their vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub username: String,
    pub label: Option<i32>,
    pub vector: FeatureVector,
}

#[derive(Debug, Clone)]
pub struct FeatureCache {
    path: PathBuf,
    users: Vec<UserFeatures>,
}

impl FeatureCache {
    /// Reads the cache at `path`. A missing file is an empty cache.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let users = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| CacheError::Json {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(CacheError::Io { path, source }),
        };
        Ok(Self { path, users })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.users.iter().any(|u| u.username == username)
    }

    #[must_use]
    pub fn get(&self, username: &str) -> Option<&UserFeatures> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Adds `features`, replacing any earlier record for the same user.
    pub fn insert(&mut self, features: UserFeatures) {
        match self
            .users
            .iter_mut()
            .find(|u| u.username == features.username)
        {
            Some(existing) => *existing = features,
            None => self.users.push(features),
        }
    }

    /// Writes the cache atomically.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if serialization or the write fails.
    pub fn save(&self) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(&self.users).map_err(|source| CacheError::Json {
            path: self.path.clone(),
            source,
        })?;
        write_atomic(&self.path, &bytes).map_err(|source| CacheError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), users = self.users.len(), "saved feature cache");
        Ok(())
    }

    /// Classifier rows for every cached user whose vector is complete.
    #[must_use]
    pub fn vectors(&self) -> Vec<ExportRow> {
        self.users
            .iter()
            .filter_map(|u| match u.vector() {
                Ok(vector) => Some(ExportRow {
                    username: u.username.clone(),
                    label: u.label,
                    vector,
                }),
                Err(e) => {
                    tracing::warn!(username = %u.username, error = %e, "skipping incomplete cached user");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::sample_features;

    #[test]
    fn missing_file_is_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FeatureCache::load(dir.path().join("users.json")).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn round_trip_reproduces_identical_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");

        let mut alice = sample_features("alice");
        alice.engagement = 0.1 + 0.2;
        alice.colorfulness_std = 1.0 / 3.0;
        let mut cache = FeatureCache::load(&path).unwrap();
        cache.insert(alice.clone());
        cache.insert(sample_features("bob"));
        cache.save().unwrap();

        let reloaded = FeatureCache::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("alice"), Some(&alice));
    }

    #[test]
    fn insert_replaces_same_username() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FeatureCache::load(dir.path().join("users.json")).unwrap();
        cache.insert(sample_features("alice"));
        let mut updated = sample_features("alice");
        updated.followers = 999;
        cache.insert(updated);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("alice").map(|u| u.followers), Some(999));
        assert!(cache.contains("alice"));
        assert!(!cache.contains("bob"));
    }

    #[test]
    fn vectors_skip_incomplete_users() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FeatureCache::load(dir.path().join("users.json")).unwrap();
        cache.insert(sample_features("alice"));
        let mut broken = sample_features("bob");
        broken.color_distorsion = None;
        cache.insert(broken);

        let rows = cache.vectors();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "alice");
        assert_eq!(rows[0].label, Some(1));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, b"{not json").unwrap();
        assert!(matches!(FeatureCache::load(&path), Err(CacheError::Json { .. })));
    }
}
