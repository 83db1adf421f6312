use super::*;
use crate::manifest::ColumnDoc;
use chrono::Utc;

fn cols() -> Vec<ColumnDef> {
    vec![
        ColumnDef {
            name: "id".into(),
            data_type: "BIGINT".into(),
            nullable: false,
        },
        ColumnDef {
            name: "created_at".into(),
            data_type: "TIMESTAMP".into(),
            nullable: true,
        },
    ]
}

fn docs() -> ModelDocumentation {
    ModelDocumentation {
        description: Some("Orders fact table".into()),
        columns: vec![ColumnDoc {
            name: "id".into(),
            description: Some("Primary key".into()),
        }],
    }
}

fn cached() -> ModelHashRecord {
    ModelHashRecord {
        schema_hash: schema_hash(&cols()),
        documentation_hash: documentation_hash(&docs()),
        logic_hash: logic_hash("select 1"),
        last_profiled: Utc::now(),
        profile_path: "models/analytics_orders.md".into(),
        warehouse_table: "analytics.orders".into(),
    }
}

// --- hash functions ---

#[test]
fn test_schema_hash_stable() {
    assert_eq!(schema_hash(&cols()), schema_hash(&cols()));
}

#[test]
fn test_schema_hash_order_sensitive() {
    let mut reordered = cols();
    reordered.reverse();
    assert_ne!(schema_hash(&cols()), schema_hash(&reordered));
}

#[test]
fn test_schema_hash_detects_type_change() {
    let mut changed = cols();
    changed[0].data_type = "VARCHAR".into();
    assert_ne!(schema_hash(&cols()), schema_hash(&changed));
}

#[test]
fn test_schema_hash_detects_nullability_change() {
    let mut changed = cols();
    changed[0].nullable = true;
    assert_ne!(schema_hash(&cols()), schema_hash(&changed));
}

#[test]
fn test_documentation_hash_detects_column_description_change() {
    let mut changed = docs();
    changed.columns[0].description = Some("Surrogate key".into());
    assert_ne!(documentation_hash(&docs()), documentation_hash(&changed));
}

#[test]
fn test_logic_hash_ignores_comments_and_whitespace() {
    let a = logic_hash("select  id\nfrom orders -- trailing note");
    let b = logic_hash("/* header */ SELECT id FROM orders");
    assert_eq!(a, b);
}

#[test]
fn test_logic_hash_case_folds() {
    // Lower-casing before hashing is intentional (see DESIGN.md); the
    // digest cannot distinguish identifier case.
    assert_eq!(logic_hash("SELECT ID FROM T"), logic_hash("select id from t"));
}

#[test]
fn test_logic_hash_detects_real_change() {
    assert_ne!(
        logic_hash("select id from orders"),
        logic_hash("select id, total from orders")
    );
}

#[test]
fn test_normalize_keeps_string_literals() {
    let n = normalize_logic("select '--not a comment' as v");
    assert!(n.contains("--not a comment"));
}

#[test]
fn test_normalize_strips_block_comment_mid_token() {
    assert_eq!(
        normalize_logic("select a/*x*/b from t"),
        "select a b from t"
    );
}

// --- detect_changes ---

#[test]
fn test_new_model_should_reprofile() {
    let (report, hashes) = detect_changes(None, Some(&cols()), Some(&docs()), Some("select 1"));
    assert!(report.is_new);
    assert!(report.should_reprofile());
    assert!(hashes.schema.is_some());
    assert!(hashes.documentation.is_some());
    assert!(hashes.logic.is_some());
}

#[test]
fn test_unchanged_model_not_reprofiled() {
    let rec = cached();
    let (report, _) = detect_changes(Some(&rec), Some(&cols()), Some(&docs()), Some("select 1"));
    assert!(!report.is_new);
    assert!(!report.schema_changed);
    assert!(!report.documentation_changed);
    assert!(!report.logic_changed);
    assert!(!report.should_reprofile());
}

#[test]
fn test_single_axis_change_detected() {
    let rec = cached();
    let (report, _) = detect_changes(
        Some(&rec),
        Some(&cols()),
        Some(&docs()),
        Some("select 2"),
    );
    assert!(!report.schema_changed);
    assert!(!report.documentation_changed);
    assert!(report.logic_changed);
    assert!(report.should_reprofile());
}

#[test]
fn test_axes_are_independent() {
    let rec = cached();
    let mut changed_cols = cols();
    changed_cols[0].data_type = "VARCHAR".into();
    let (report, _) = detect_changes(
        Some(&rec),
        Some(&changed_cols),
        Some(&docs()),
        Some("select 1"),
    );
    assert!(report.schema_changed);
    assert!(!report.documentation_changed);
    assert!(!report.logic_changed);
}

#[test]
fn test_failed_schema_lookup_defaults_to_changed() {
    let rec = cached();
    let (report, hashes) = detect_changes(Some(&rec), None, Some(&docs()), Some("select 1"));
    assert!(report.schema_changed);
    assert!(report.should_reprofile());
    assert!(hashes.schema.is_none());
}

#[test]
fn test_failed_docs_and_logic_lookups_default_to_unchanged() {
    let rec = cached();
    let (report, _) = detect_changes(Some(&rec), Some(&cols()), None, None);
    assert!(!report.documentation_changed);
    assert!(!report.logic_changed);
    assert!(!report.should_reprofile());
}

#[test]
fn test_all_lookups_failed_still_reprofiles_via_schema() {
    // The asymmetry: with nothing resolvable, the schema default alone
    // forces a reprofile.
    let rec = cached();
    let (report, _) = detect_changes(Some(&rec), None, None, None);
    assert!(report.schema_changed);
    assert!(report.should_reprofile());
}

#[test]
fn test_removed_documentation_is_a_change() {
    let rec = cached();
    let empty = ModelDocumentation::default();
    let (report, _) = detect_changes(Some(&rec), Some(&cols()), Some(&empty), Some("select 1"));
    assert!(report.documentation_changed);
}
