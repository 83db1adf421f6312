//! Compiled-manifest metadata
//!
//! The transformation project's own compiler emits a manifest JSON file
//! with per-model metadata this system cannot derive from raw definition
//! text: fully-qualified warehouse table names, declared documentation,
//! compiled query text, and tags. Datascribe consumes that file read-only
//! through the [`ProjectMetadata`] trait; every lookup degrades gracefully
//! when the manifest is missing or incomplete.

use crate::error::{CoreError, CoreResult};
use crate::name::{ModelName, TableName};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Declared documentation for one model: a relation description plus
/// per-column descriptions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDocumentation {
    /// Relation-level description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Per-column declared descriptions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnDoc>,
}

/// A declared column description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDoc {
    /// Column name
    pub name: String,

    /// Declared description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A model entry in the compiled manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestModel {
    /// Model name
    pub name: ModelName,

    /// Fully-qualified warehouse table the model materializes into
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<TableName>,

    /// Path of the definition file relative to the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Model tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Declared documentation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<ModelDocumentation>,

    /// Compiled query text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiled_sql: Option<String>,
}

/// The compiled manifest document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Project name
    pub project_name: String,

    /// Timestamp when compiled
    pub compiled_at: String,

    /// All models in the compiled project
    pub models: HashMap<ModelName, ManifestModel>,
}

impl Manifest {
    /// Load a manifest from a JSON file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| CoreError::ManifestError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load a manifest if the file exists, `None` otherwise.
    ///
    /// A present-but-malformed manifest is still an error; only absence is
    /// tolerated here.
    pub fn load_optional(path: &Path) -> CoreResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Get a model entry by name.
    pub fn get_model(&self, name: &str) -> Option<&ManifestModel> {
        self.models.get(name)
    }

    /// Tags declared for a model, empty when unknown.
    pub fn model_tags(&self, name: &str) -> &[String] {
        self.models.get(name).map(|m| m.tags.as_slice()).unwrap_or(&[])
    }
}

/// Read-only metadata lookups about the compiled project.
///
/// Each method distinguishes "the model has no such metadata" (`Ok(None)`)
/// from "the lookup itself failed" (`Err`); the change detector's failure
/// policy depends on that distinction.
pub trait ProjectMetadata {
    /// Fully-qualified warehouse table name for a model.
    fn model_table_name(&self, name: &str) -> CoreResult<Option<TableName>>;

    /// Declared documentation for a model.
    fn model_documentation(&self, name: &str) -> CoreResult<Option<ModelDocumentation>>;

    /// Compiled query text for a model.
    fn compiled_sql(&self, name: &str) -> CoreResult<Option<String>>;
}

impl ProjectMetadata for Manifest {
    fn model_table_name(&self, name: &str) -> CoreResult<Option<TableName>> {
        Ok(self.models.get(name).and_then(|m| m.table_name.clone()))
    }

    fn model_documentation(&self, name: &str) -> CoreResult<Option<ModelDocumentation>> {
        Ok(self.models.get(name).and_then(|m| m.documentation.clone()))
    }

    fn compiled_sql(&self, name: &str) -> CoreResult<Option<String>> {
        Ok(self.models.get(name).and_then(|m| m.compiled_sql.clone()))
    }
}

#[cfg(test)]
#[path = "manifest_test.rs"]
mod tests;
