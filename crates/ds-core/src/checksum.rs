//! SHA-256 checksum utilities for change detection.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 checksum of a string, hex-encoded.
pub fn compute_checksum(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Compute the SHA-256 checksum of a value's canonical JSON form.
///
/// Canonical here means `serde_json::to_string` with struct fields in
/// declaration order and map keys in whatever order the value type
/// guarantees (use `BTreeMap` for sorted keys). Serialization failures
/// surface as `Err` so callers can apply their own failure policy.
pub fn canonical_json_checksum<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    Ok(compute_checksum(&json))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_stable() {
        let a = compute_checksum("select 1");
        let b = compute_checksum("select 1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_checksum_differs() {
        assert_ne!(compute_checksum("select 1"), compute_checksum("select 2"));
    }

    #[test]
    fn test_canonical_json_checksum_stable() {
        #[derive(serde::Serialize)]
        struct Col {
            name: String,
            nullable: bool,
        }
        let cols = vec![Col {
            name: "id".into(),
            nullable: false,
        }];
        let a = canonical_json_checksum(&cols).unwrap();
        let b = canonical_json_checksum(&cols).unwrap();
        assert_eq!(a, b);
    }
}
