//! Selection micro-language over the scanned model graph
//!
//! Supported patterns:
//! - `model_name` - exact name match
//! - `stg_*` - wildcard (anchored, `*` matches any run of characters)
//! - `+model_name` - model and everything it transitively references
//! - `model_name+` - model and everything that transitively references it
//! - `+model_name+` - union of both traversals
//! - `tag:daily` - models carrying the tag in the compiled manifest
//! - `path:staging/*` - models whose scan-relative path matches the glob
//!
//! Multiple patterns (comma- or whitespace-separated) are unioned for
//! inclusion. Exclusion patterns use the identical grammar, are resolved
//! the same way, and are subtracted by name afterwards — exclusion always
//! wins regardless of pattern order.

use crate::error::{CoreError, CoreResult};
use crate::graph::RefGraph;
use crate::manifest::Manifest;
use crate::model::ModelGraph;
use crate::name::ModelName;
use regex::Regex;
use std::collections::HashSet;

/// One parsed selection pattern.
#[derive(Debug, Clone)]
pub enum SelectionPattern {
    /// Model name with optional +prefix/+suffix traversal operators
    Model {
        name: String,
        include_upstream: bool,
        include_downstream: bool,
    },
    /// Anchored wildcard over model names
    Wildcard { pattern: String, regex: Regex },
    /// Tag-based selection (requires a compiled manifest)
    Tag { tag: String },
    /// Path-based selection with glob pattern
    Path { pattern: String },
}

impl SelectionPattern {
    /// Parse a single selection pattern.
    pub fn parse(pattern: &str) -> CoreResult<Self> {
        let pattern = pattern.trim();

        if let Some(tag) = pattern.strip_prefix("tag:") {
            if tag.is_empty() {
                return Err(invalid(pattern, "tag: selector requires a tag name"));
            }
            return Ok(SelectionPattern::Tag {
                tag: tag.to_string(),
            });
        }

        if let Some(glob) = pattern.strip_prefix("path:") {
            if glob.is_empty() {
                return Err(invalid(pattern, "path: selector requires a pattern"));
            }
            return Ok(SelectionPattern::Path {
                pattern: glob.to_string(),
            });
        }

        let include_upstream = pattern.starts_with('+');
        let include_downstream = pattern.ends_with('+');
        let name = pattern
            .trim_start_matches('+')
            .trim_end_matches('+')
            .to_string();

        if name.is_empty() {
            return Err(invalid(pattern, "model name cannot be empty"));
        }

        if name.contains('*') {
            if include_upstream || include_downstream {
                return Err(invalid(
                    pattern,
                    "wildcards cannot combine with graph operators",
                ));
            }
            let regex = wildcard_regex(&name)
                .map_err(|e| invalid(pattern, &format!("invalid wildcard: {e}")))?;
            return Ok(SelectionPattern::Wildcard {
                pattern: name,
                regex,
            });
        }

        Ok(SelectionPattern::Model {
            name,
            include_upstream,
            include_downstream,
        })
    }

    /// Resolve this pattern to a set of model names.
    fn resolve(
        &self,
        models: &ModelGraph,
        refs: &RefGraph,
        manifest: Option<&Manifest>,
    ) -> HashSet<ModelName> {
        match self {
            SelectionPattern::Model {
                name,
                include_upstream,
                include_downstream,
            } => {
                if !models.contains(name) {
                    log::warn!("Selector '{name}' matches no model");
                    return HashSet::new();
                }
                let mut selected = HashSet::from([ModelName::new(name.clone())]);
                if *include_upstream {
                    selected.extend(refs.upstream(name));
                }
                if *include_downstream {
                    selected.extend(refs.downstream(name));
                }
                selected
            }
            SelectionPattern::Wildcard { regex, .. } => models
                .nodes()
                .iter()
                .filter(|n| regex.is_match(&n.name))
                .map(|n| n.name.clone())
                .collect(),
            SelectionPattern::Tag { tag } => {
                let Some(manifest) = manifest else {
                    log::warn!("tag:{tag} selector requires a compiled manifest; selecting nothing");
                    return HashSet::new();
                };
                models
                    .nodes()
                    .iter()
                    .filter(|n| manifest.model_tags(&n.name).iter().any(|t| t == tag))
                    .map(|n| n.name.clone())
                    .collect()
            }
            SelectionPattern::Path { pattern } => models
                .nodes()
                .iter()
                .filter(|n| matches_path_pattern(&n.rel_path.to_string_lossy(), pattern))
                .map(|n| n.name.clone())
                .collect(),
        }
    }
}

/// A full selection: inclusion patterns unioned, exclusion patterns
/// subtracted by name.
#[derive(Debug, Default)]
pub struct Selection {
    include: Vec<SelectionPattern>,
    exclude: Vec<SelectionPattern>,
}

impl Selection {
    /// Parse a selection string (comma- or whitespace-separated patterns)
    /// plus an exclusion list in the same grammar.
    pub fn parse(include: &str, exclude: &[String]) -> CoreResult<Self> {
        let include_list: Vec<String> = split_patterns(include);
        Self::from_lists(&include_list, exclude)
    }

    /// Build a selection from pre-split pattern lists.
    pub fn from_lists(include: &[String], exclude: &[String]) -> CoreResult<Self> {
        Ok(Self {
            include: include
                .iter()
                .map(|p| SelectionPattern::parse(p))
                .collect::<CoreResult<_>>()?,
            exclude: exclude
                .iter()
                .map(|p| SelectionPattern::parse(p))
                .collect::<CoreResult<_>>()?,
        })
    }

    /// Whether any inclusion pattern was supplied.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty()
    }
}

/// Resolve a selection against the scanned graph.
///
/// Returns matching model names in scan order. An empty inclusion list
/// selects every model (exclusions still apply).
pub fn apply_selection(
    selection: &Selection,
    models: &ModelGraph,
    refs: &RefGraph,
    manifest: Option<&Manifest>,
) -> Vec<ModelName> {
    let mut included: HashSet<ModelName> = if selection.include.is_empty() {
        models.nodes().iter().map(|n| n.name.clone()).collect()
    } else {
        selection
            .include
            .iter()
            .flat_map(|p| p.resolve(models, refs, manifest))
            .collect()
    };

    for pattern in &selection.exclude {
        for name in pattern.resolve(models, refs, manifest) {
            included.remove(&name);
        }
    }

    models
        .nodes()
        .iter()
        .filter(|n| included.contains(&n.name))
        .map(|n| n.name.clone())
        .collect()
}

/// Split a selection string on commas and whitespace.
fn split_patterns(s: &str) -> Vec<String> {
    s.split([',', ' ', '\t'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Compile a `*`-wildcard into an anchored regex: `stg_*` becomes
/// `^stg_.*$`, matching whole names only.
fn wildcard_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut re = String::with_capacity(pattern.len() + 4);
    re.push('^');
    for part in pattern.split('*') {
        re.push_str(&regex::escape(part));
        re.push_str(".*");
    }
    // One ".*" too many was appended after the final literal part.
    re.truncate(re.len() - 2);
    re.push('$');
    Regex::new(&re)
}

/// Check if a scan-relative path matches a glob-like pattern.
///
/// `*` matches within a path segment, `**` matches across segments.
fn matches_path_pattern(path: &str, pattern: &str) -> bool {
    if pattern.contains("**") {
        let parts: Vec<&str> = pattern.split("**").collect();
        if parts.len() == 2 {
            let prefix = parts[0].trim_end_matches('/');
            let suffix = parts[1].trim_start_matches('/');

            let matches_prefix = prefix.is_empty() || path.starts_with(prefix);
            let matches_suffix = suffix.is_empty()
                || suffix == "*"
                || path.ends_with(suffix)
                || (suffix.starts_with("*.") && {
                    let ext = suffix.trim_start_matches("*.");
                    path.ends_with(&format!(".{}", ext))
                });

            return matches_prefix && matches_suffix;
        }
    }

    if pattern.contains('*') {
        let parts: Vec<&str> = pattern.split('*').collect();
        if parts.len() == 2 {
            let prefix = parts[0];
            let suffix = parts[1];

            let matches_prefix = prefix.is_empty() || path.starts_with(prefix);
            let matches_suffix = suffix.is_empty() || path.ends_with(suffix);

            return matches_prefix && matches_suffix;
        }
    }

    path.contains(pattern)
}

fn invalid(pattern: &str, reason: &str) -> CoreError {
    CoreError::InvalidSelector {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[path = "selector_test.rs"]
mod tests;
