use super::*;
use chrono::Utc;

fn record(table: &str) -> ModelHashRecord {
    ModelHashRecord {
        schema_hash: "s1".into(),
        documentation_hash: "d1".into(),
        logic_hash: "l1".into(),
        last_profiled: Utc::now(),
        profile_path: format!("models/{table}.md"),
        warehouse_table: format!("analytics.{table}"),
    }
}

#[test]
fn test_load_missing_is_empty_default() {
    let dir = tempfile::tempdir().unwrap();
    let cache = HashCacheFile::load(&dir.path().join("model-hashes.json")).unwrap();
    assert_eq!(cache.version, CACHE_VERSION);
    assert!(cache.models.is_empty());
}

#[test]
fn test_save_and_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".cache/model-hashes.json");

    let mut cache = HashCacheFile::default();
    cache.upsert("dim_customers", record("dim_customers"));
    cache.save(&path).unwrap();

    let loaded = HashCacheFile::load(&path).unwrap();
    assert_eq!(loaded.models.len(), 1);
    let rec = loaded.get("dim_customers").unwrap();
    assert_eq!(rec.schema_hash, "s1");
    assert_eq!(rec.warehouse_table, "analytics.dim_customers");
}

#[test]
fn test_on_disk_layout_is_camel_case() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model-hashes.json");

    let mut cache = HashCacheFile::default();
    cache.upsert("m", record("m"));
    cache.save(&path).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"lastSync\""));
    assert!(raw.contains("\"schemaHash\""));
    assert!(raw.contains("\"documentationHash\""));
    assert!(raw.contains("\"logicHash\""));
    assert!(raw.contains("\"lastProfiled\""));
    assert!(raw.contains("\"profilePath\""));
    assert!(raw.contains("\"warehouseTable\""));
    assert!(!raw.contains("schema_hash"));
}

#[test]
fn test_save_overwrites_whole_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model-hashes.json");

    let mut cache = HashCacheFile::default();
    cache.upsert("a", record("a"));
    cache.upsert("b", record("b"));
    cache.save(&path).unwrap();

    let mut second = HashCacheFile::default();
    second.upsert("a", record("a"));
    second.save(&path).unwrap();

    let loaded = HashCacheFile::load(&path).unwrap();
    assert_eq!(loaded.models.len(), 1);
    assert!(loaded.get("b").is_none());
}

#[test]
fn test_malformed_cache_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model-hashes.json");
    std::fs::write(&path, "{").unwrap();
    assert!(HashCacheFile::load(&path).is_err());
}

#[test]
fn test_upsert_replaces() {
    let mut cache = HashCacheFile::default();
    cache.upsert("m", record("m"));
    let mut updated = record("m");
    updated.schema_hash = "s2".into();
    cache.upsert("m", updated);
    assert_eq!(cache.get("m").unwrap().schema_hash, "s2");
}
