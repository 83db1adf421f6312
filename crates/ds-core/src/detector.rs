//! Change detection over three independent fingerprints
//!
//! Each model carries three hashes derived from disjoint inputs: the
//! warehouse-reported schema shape, the declared documentation text, and
//! the normalized compiled query text. A change on one axis never implies
//! a change on another.
//!
//! The functions here are pure: callers perform the warehouse / metadata
//! lookups and pass `Option`s, with `None` meaning "the lookup failed".
//! Failure defaults are asymmetric by design: a failed schema lookup
//! counts as *changed*, failed documentation or logic lookups count as
//! *unchanged*.

use crate::checksum::{canonical_json_checksum, compute_checksum};
use crate::hash_cache::ModelHashRecord;
use crate::manifest::ModelDocumentation;
use crate::profile::ColumnDef;

/// Which of the three fingerprints differ from the cached record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeReport {
    /// No cached record exists for this model
    pub is_new: bool,

    /// Warehouse schema shape differs (or its lookup failed)
    pub schema_changed: bool,

    /// Declared documentation differs
    pub documentation_changed: bool,

    /// Normalized compiled logic differs
    pub logic_changed: bool,
}

impl ChangeReport {
    /// Whether the model must be reprofiled.
    pub fn should_reprofile(&self) -> bool {
        self.is_new || self.schema_changed || self.documentation_changed || self.logic_changed
    }
}

/// Freshly computed hashes, `None` per axis when the lookup failed.
///
/// After a successful profile the caller merges these over the cached
/// record, keeping the old value for any axis that could not be computed.
#[derive(Debug, Clone, Default)]
pub struct ComputedHashes {
    pub schema: Option<String>,
    pub documentation: Option<String>,
    pub logic: Option<String>,
}

/// Compare fresh lookups against a cached record.
///
/// `schema` / `docs` / `compiled` are `None` when the corresponding
/// upstream lookup failed. Returns the change report plus the computed
/// hashes for cache maintenance.
pub fn detect_changes(
    cached: Option<&ModelHashRecord>,
    schema: Option<&[ColumnDef]>,
    docs: Option<&ModelDocumentation>,
    compiled: Option<&str>,
) -> (ChangeReport, ComputedHashes) {
    let hashes = ComputedHashes {
        schema: schema.map(schema_hash),
        documentation: docs.map(documentation_hash),
        logic: compiled.map(logic_hash),
    };

    let Some(cached) = cached else {
        return (
            ChangeReport {
                is_new: true,
                ..ChangeReport::default()
            },
            hashes,
        );
    };

    let report = ChangeReport {
        is_new: false,
        // Schema lookup failure counts as changed; documentation and
        // logic lookup failures count as unchanged.
        schema_changed: match &hashes.schema {
            Some(h) => *h != cached.schema_hash,
            None => true,
        },
        documentation_changed: match &hashes.documentation {
            Some(h) => *h != cached.documentation_hash,
            None => false,
        },
        logic_changed: match &hashes.logic {
            Some(h) => *h != cached.logic_hash,
            None => false,
        },
    };

    (report, hashes)
}

/// Digest of the warehouse-reported column list.
///
/// Columns are hashed in warehouse-reported order: a reorder is a real
/// schema change for positional consumers, so order sensitivity is
/// intentional.
pub fn schema_hash(columns: &[ColumnDef]) -> String {
    canonical_json_checksum(&columns).expect("column list serializes infallibly")
}

/// Digest of the declared documentation (relation description plus
/// per-column descriptions).
pub fn documentation_hash(docs: &ModelDocumentation) -> String {
    canonical_json_checksum(&docs).expect("documentation serializes infallibly")
}

/// Digest of compiled query text after normalization.
pub fn logic_hash(sql: &str) -> String {
    compute_checksum(&normalize_logic(sql))
}

/// Normalize compiled query text: strip comments, collapse whitespace,
/// lower-case.
///
/// Lower-casing can mask identifier case changes on case-sensitive
/// warehouses; it is kept for compatibility with existing cache files.
pub fn normalize_logic(sql: &str) -> String {
    strip_comments(sql)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Remove `--` line comments and `/* */` block comments, leaving string
/// literals untouched.
fn strip_comments(sql: &str) -> String {
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '-' if chars.get(i + 1) == Some(&'-') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() {
                    if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
                // Comments separate tokens; keep a space in their place.
                out.push(' ');
            }
            quote @ ('\'' | '"') => {
                out.push(quote);
                i += 1;
                while i < chars.len() {
                    out.push(chars[i]);
                    if chars[i] == quote {
                        if chars.get(i + 1) == Some(&quote) {
                            out.push(quote);
                            i += 2;
                            continue;
                        }
                        i += 1;
                        break;
                    }
                    i += 1;
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

#[cfg(test)]
#[path = "detector_test.rs"]
mod tests;
