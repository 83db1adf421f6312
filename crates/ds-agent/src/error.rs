//! Error types for ds-agent

use thiserror::Error;

/// Orchestration error type
#[derive(Error, Debug)]
pub enum AgentError {
    /// Build refused: the artifact directory already exists
    #[error("Artifact directory already exists: {path}. Use --force to overwrite.")]
    TargetExists { path: String },

    /// Update refused: the artifact directory does not exist
    #[error("Artifact directory does not exist: {path}. Run a build first.")]
    TargetMissing { path: String },

    /// Core error (scanning, selection, cache, manifest)
    #[error(transparent)]
    Core(#[from] ds_core::CoreError),

    /// Warehouse error (connection or table enumeration)
    #[error(transparent)]
    Db(#[from] ds_db::DbError),

    /// Failed to write an artifact
    #[error("Failed to write '{path}': {source}")]
    ArtifactWrite {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for AgentError
pub type AgentResult<T> = Result<T, AgentError>;
