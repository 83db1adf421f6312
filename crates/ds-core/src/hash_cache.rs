//! Persisted hash cache for change detection
//!
//! One JSON document holds a fingerprint record per model. The document is
//! read once at the start of a detection pass and rewritten whole after the
//! run — never patched in place. Field names on disk are camelCase; that
//! layout is a compatibility contract with earlier cache files.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Current cache document version.
pub const CACHE_VERSION: &str = "1";

/// Cached fingerprints for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelHashRecord {
    /// Digest of the warehouse-reported column list
    pub schema_hash: String,

    /// Digest of the declared documentation
    pub documentation_hash: String,

    /// Digest of the normalized compiled query text
    pub logic_hash: String,

    /// When the model was last successfully profiled
    pub last_profiled: DateTime<Utc>,

    /// Artifact file the last profile was written to
    pub profile_path: String,

    /// Fully-qualified warehouse table that was profiled
    pub warehouse_table: String,
}

/// The cache document as persisted on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashCacheFile {
    /// Document format version
    pub version: String,

    /// When the cache was last rewritten
    pub last_sync: DateTime<Utc>,

    /// Model name -> fingerprint record
    pub models: BTreeMap<String, ModelHashRecord>,
}

impl Default for HashCacheFile {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION.to_string(),
            last_sync: Utc::now(),
            models: BTreeMap::new(),
        }
    }
}

impl HashCacheFile {
    /// Load the cache from a file, returning an empty cache when the file
    /// does not exist.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| CoreError::CacheParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save the cache atomically (write-to-temp-then-rename), stamping
    /// `last_sync` with the current time.
    pub fn save(&mut self, path: &Path) -> CoreResult<()> {
        self.last_sync = Utc::now();
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::IoWithPath {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let temp_path = path.with_extension(format!("json.{}.tmp", std::process::id()));
        std::fs::write(&temp_path, &json).map_err(|e| CoreError::IoWithPath {
            path: temp_path.display().to_string(),
            source: e,
        })?;
        std::fs::rename(&temp_path, path).map_err(|e| {
            let _ = std::fs::remove_file(&temp_path);
            CoreError::IoWithPath {
                path: path.display().to_string(),
                source: e,
            }
        })?;
        Ok(())
    }

    /// Get a model's record by name.
    pub fn get(&self, name: &str) -> Option<&ModelHashRecord> {
        self.models.get(name)
    }

    /// Insert or replace a model's record.
    pub fn upsert(&mut self, name: impl Into<String>, record: ModelHashRecord) {
        self.models.insert(name.into(), record);
    }
}

#[cfg(test)]
#[path = "hash_cache_test.rs"]
mod tests;
