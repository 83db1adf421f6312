//! Scanned model representation

use crate::name::ModelName;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// A reference to an externally-owned raw table, declared via a
/// `source("group","table")` marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source group name (first argument)
    pub source: String,

    /// Table name within the group (second argument)
    pub table: String,
}

/// A configuration value from an inline `config(...)` block.
///
/// Values are stored with their recognized type: `true`/`false` literals
/// become booleans, fully-numeric values become numbers, everything else
/// stays a quote-stripped string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl ConfigValue {
    /// Parse a raw token from a config block into a typed value.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        // Quoted values are always strings
        if (trimmed.starts_with('\'') && trimmed.ends_with('\'') && trimmed.len() >= 2)
            || (trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2)
        {
            return ConfigValue::String(trimmed[1..trimmed.len() - 1].to_string());
        }

        match trimmed {
            "true" => return ConfigValue::Bool(true),
            "false" => return ConfigValue::Bool(false),
            _ => {}
        }

        if let Ok(n) = trimmed.parse::<f64>() {
            return ConfigValue::Number(n);
        }

        ConfigValue::String(trimmed.to_string())
    }

    /// Return the value as a string slice if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Return the value as a bool if it is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Number(n) => write!(f, "{n}"),
            ConfigValue::String(s) => f.write_str(s),
        }
    }
}

/// One declared transformation unit, as reconstructed by the scanner.
///
/// A `ModelNode` is an immutable snapshot: it is rebuilt on every scan and
/// has no identity across scans beyond its name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelNode {
    /// Model name (derived from filename without extension)
    pub name: ModelName,

    /// Absolute path to the definition file
    pub path: PathBuf,

    /// Path relative to the scan root
    pub rel_path: PathBuf,

    /// Raw definition text
    pub raw_text: String,

    /// Names of models this model references
    pub refs: Vec<ModelName>,

    /// External source references
    pub sources: Vec<SourceRef>,

    /// Key/value configuration from the inline config block
    pub config: BTreeMap<String, ConfigValue>,
}

/// The full scanned project: an ordered collection of model nodes plus
/// aggregate counts. Built once per scan invocation and read-only after.
#[derive(Debug, Clone, Default)]
pub struct ModelGraph {
    nodes: Vec<ModelNode>,
    by_name: HashMap<ModelName, usize>,

    /// Total number of model references across all nodes
    pub ref_count: usize,

    /// Total number of external source references across all nodes
    pub source_count: usize,
}

impl ModelGraph {
    /// Build a graph from scanned nodes.
    ///
    /// When two files produce the same model name the first one wins and
    /// the duplicate is dropped with a warning.
    pub fn from_nodes(nodes: Vec<ModelNode>) -> Self {
        let mut graph = ModelGraph::default();
        for node in nodes {
            if graph.by_name.contains_key(&node.name) {
                log::warn!(
                    "Duplicate model name '{}' from {} ignored",
                    node.name,
                    node.path.display()
                );
                continue;
            }
            graph.ref_count += node.refs.len();
            graph.source_count += node.sources.len();
            graph.by_name.insert(node.name.clone(), graph.nodes.len());
            graph.nodes.push(node);
        }
        graph
    }

    /// All nodes in scan order.
    pub fn nodes(&self) -> &[ModelNode] {
        &self.nodes
    }

    /// Look up a node by model name.
    pub fn get(&self, name: &str) -> Option<&ModelNode> {
        self.by_name.get(name).map(|&i| &self.nodes[i])
    }

    /// Whether a model with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of models in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no models.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All model names in scan order.
    pub fn names(&self) -> Vec<&ModelName> {
        self.nodes.iter().map(|n| &n.name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, refs: &[&str]) -> ModelNode {
        ModelNode {
            name: ModelName::new(name),
            path: PathBuf::from(format!("/p/{name}.sql")),
            rel_path: PathBuf::from(format!("{name}.sql")),
            raw_text: String::new(),
            refs: refs.iter().map(|r| ModelName::new(*r)).collect(),
            sources: Vec::new(),
            config: BTreeMap::new(),
        }
    }

    #[test]
    fn test_config_value_parse() {
        assert_eq!(
            ConfigValue::parse("'table'"),
            ConfigValue::String("table".into())
        );
        assert_eq!(
            ConfigValue::parse("\"view\""),
            ConfigValue::String("view".into())
        );
        assert_eq!(ConfigValue::parse("true"), ConfigValue::Bool(true));
        assert_eq!(ConfigValue::parse("false"), ConfigValue::Bool(false));
        assert_eq!(ConfigValue::parse("42"), ConfigValue::Number(42.0));
        assert_eq!(ConfigValue::parse("3.5"), ConfigValue::Number(3.5));
        assert_eq!(
            ConfigValue::parse("daily"),
            ConfigValue::String("daily".into())
        );
    }

    #[test]
    fn test_quoted_true_stays_string() {
        assert_eq!(
            ConfigValue::parse("'true'"),
            ConfigValue::String("true".into())
        );
    }

    #[test]
    fn test_graph_counts() {
        let graph = ModelGraph::from_nodes(vec![
            node("stg_orders", &[]),
            node("dim_customers", &["stg_orders"]),
        ]);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.ref_count, 1);
        assert!(graph.contains("stg_orders"));
        assert!(!graph.contains("missing"));
    }

    #[test]
    fn test_duplicate_name_first_wins() {
        let mut dup = node("stg_orders", &["other"]);
        dup.path = PathBuf::from("/p/dup/stg_orders.sql");
        let graph = ModelGraph::from_nodes(vec![node("stg_orders", &[]), dup]);
        assert_eq!(graph.len(), 1);
        assert!(graph.get("stg_orders").unwrap().refs.is_empty());
    }
}
