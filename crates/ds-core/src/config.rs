//! Configuration types and parsing for datascribe.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main project configuration from datascribe.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Directories containing model definition files, relative to the
    /// project root
    #[serde(default = "default_model_paths")]
    pub model_paths: Vec<String>,

    /// Directory the context artifacts are written to, relative to the
    /// project root
    #[serde(default = "default_artifact_path")]
    pub artifact_path: String,

    /// Path to the compiled manifest emitted by the project's own
    /// compiler, relative to the project root
    #[serde(default = "default_manifest_path")]
    pub manifest_path: String,

    /// Warehouse connection configuration
    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// Generative-text enrichment configuration
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

/// Warehouse connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Database path (file-based or :memory:)
    #[serde(default = "default_warehouse_path")]
    pub path: String,

    /// Schema the project materializes models into
    #[serde(default = "default_schema")]
    pub schema: String,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            path: default_warehouse_path(),
            schema: default_schema(),
        }
    }
}

/// Generative-text enrichment configuration.
///
/// The API key is never part of the file; it comes from the
/// `OPENAI_API_KEY` environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Whether enrichment calls are attempted at all. When false every
    /// artifact uses the deterministic fallback.
    #[serde(default)]
    pub enabled: bool,

    /// Model identifier sent to the generation endpoint
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Token budget per generation call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: default_llm_model(),
            base_url: default_llm_base_url(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl Config {
    /// Load configuration from a project directory (expects
    /// `datascribe.yml` at its root).
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let path = dir.join("datascribe.yml");
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(&path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: format!("{}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigParseError {
                message: "project name cannot be empty".to_string(),
            });
        }
        if self.model_paths.is_empty() {
            return Err(CoreError::ConfigParseError {
                message: "model_paths cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Model directories resolved against the project root.
    pub fn model_paths_absolute(&self, root: &Path) -> Vec<PathBuf> {
        self.model_paths.iter().map(|p| root.join(p)).collect()
    }

    /// Artifact directory resolved against the project root.
    pub fn artifact_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.artifact_path)
    }

    /// Manifest path resolved against the project root.
    pub fn manifest_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.manifest_path)
    }
}

fn default_model_paths() -> Vec<String> {
    vec!["models".to_string()]
}

fn default_artifact_path() -> String {
    "context".to_string()
}

fn default_manifest_path() -> String {
    "target/manifest.json".to_string()
}

fn default_warehouse_path() -> String {
    "warehouse.duckdb".to_string()
}

fn default_schema() -> String {
    "main".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_temperature() -> f32 {
    0.3
}
