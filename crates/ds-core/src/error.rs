//! Error types for ds-core

use thiserror::Error;

/// Core error type for Datascribe
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Project directory not found
    #[error("[E003] Project directory not found: {path}")]
    ProjectNotFound { path: String },

    /// E004: Model definition could not be parsed
    #[error("[E004] Parse error in {name}: {message}")]
    ModelParseError { name: String, message: String },

    /// E005: Invalid selection pattern
    #[error("[E005] Invalid selector '{pattern}': {reason}")]
    InvalidSelector { pattern: String, reason: String },

    /// E006: Manifest file could not be read or parsed
    #[error("[E006] Failed to load manifest '{path}': {message}")]
    ManifestError { path: String, message: String },

    /// E007: Hash cache file is malformed
    #[error("[E007] Failed to parse hash cache '{path}': {message}")]
    CacheParseError { path: String, message: String },

    /// E008: IO error
    #[error("[E008] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E009: IO error with file path context
    #[error("[E009] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E010: YAML parse error
    #[error("[E010] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
