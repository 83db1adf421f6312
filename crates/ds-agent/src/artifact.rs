//! Artifact directory layout
//!
//! ```text
//! <root>/
//!   system_prompt.md             static guidance document
//!   summary.md                   project narrative (generated or fallback)
//!   modelling.md                 model catalog (generated or fallback)
//!   models/<schema>_<table>.md   one per profiled table
//!   .cache/model-hashes.json     hash cache
//!   .cache/run_summary.json      last run summary
//! ```

use crate::error::{AgentError, AgentResult};
use std::path::{Path, PathBuf};

/// Static guidance document written once per build.
pub const SYSTEM_PROMPT_DOC: &str = "\
# Analytics agent context

This directory is generated documentation for an analytics agent working
against this data project.

- `summary.md` describes the project as a whole.
- `modelling.md` catalogs every model and its dependencies.
- `models/` holds one profile per warehouse table, with observed
  statistics and column documentation.

When answering questions about this project, prefer the table profiles
under `models/` for column-level facts and `modelling.md` for lineage.
Regenerate this directory with `ds update` after the project changes;
do not edit files here by hand.
";

/// Resolved paths under one artifact root.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    /// Create a layout rooted at `root`. Nothing is touched on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The artifact root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the root directory exists.
    pub fn exists(&self) -> bool {
        self.root.exists()
    }

    /// Create the directory structure (root, models/, .cache/).
    pub fn ensure_dirs(&self) -> AgentResult<()> {
        for dir in [self.root.clone(), self.models_dir(), self.cache_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| AgentError::ArtifactWrite {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Directory holding per-table profiles.
    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    /// Directory holding the cache files.
    pub fn cache_dir(&self) -> PathBuf {
        self.root.join(".cache")
    }

    /// Path of the hash cache document.
    pub fn hash_cache_file(&self) -> PathBuf {
        self.cache_dir().join("model-hashes.json")
    }

    /// Path of the persisted run summary.
    pub fn run_summary_file(&self) -> PathBuf {
        self.cache_dir().join("run_summary.json")
    }

    /// Path of the static guidance document.
    pub fn system_prompt_file(&self) -> PathBuf {
        self.root.join("system_prompt.md")
    }

    /// Path of the project narrative.
    pub fn summary_file(&self) -> PathBuf {
        self.root.join("summary.md")
    }

    /// Path of the model catalog.
    pub fn modelling_file(&self) -> PathBuf {
        self.root.join("modelling.md")
    }

    /// Relative path of one table's profile document.
    pub fn table_artifact_rel(schema: &str, table: &str) -> String {
        format!("models/{schema}_{table}.md")
    }

    /// Absolute path of one table's profile document.
    pub fn table_artifact_file(&self, schema: &str, table: &str) -> PathBuf {
        self.root.join(Self::table_artifact_rel(schema, table))
    }

    /// Write a file under the layout, mapping failures to
    /// [`AgentError::ArtifactWrite`].
    pub fn write(&self, path: &Path, content: &str) -> AgentResult<()> {
        std::fs::write(path, content).map_err(|e| AgentError::ArtifactWrite {
            path: path.display().to_string(),
            source: e,
        })
    }
}
