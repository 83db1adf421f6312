//! End-to-end orchestrator tests over an in-memory DuckDB warehouse.

use async_trait::async_trait;
use ds_agent::{BuildOptions, ContextBuilder, ContextParams, UpdateOptions};
use ds_core::{Manifest, ManifestModel, ModelName, TableName};
use ds_db::{DbError, DbResult, DuckDbWarehouse, QueryResult, Warehouse};
use ds_llm::{Generation, LlmError, LlmResult, TextGenerator, TokenUsage};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

fn warehouse_fixture() -> DuckDbWarehouse {
    let db = DuckDbWarehouse::in_memory().unwrap();
    db.execute_batch(
        "CREATE SCHEMA analytics;
         CREATE TABLE analytics.stg_customers (
             customer_id BIGINT NOT NULL,
             name VARCHAR
         );
         INSERT INTO analytics.stg_customers VALUES (1, 'Ada'), (2, 'Grace');
         CREATE TABLE analytics.dim_customers (
             customer_id BIGINT NOT NULL,
             name VARCHAR,
             first_seen TIMESTAMP
         );
         INSERT INTO analytics.dim_customers VALUES
             (1, 'Ada', '2026-01-01 00:00:00'),
             (2, 'Grace', '2026-01-05 00:00:00');",
    )
    .unwrap();
    db
}

fn project_fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let models = dir.path().join("models");
    fs::create_dir_all(&models).unwrap();
    fs::write(
        models.join("stg_customers.sql"),
        "select * from source('raw', 'customers')",
    )
    .unwrap();
    fs::write(
        models.join("dim_customers.sql"),
        "config(materialized='table')\nselect * from ref('stg_customers')",
    )
    .unwrap();
    dir
}

fn manifest_fixture(compiled_dim: &str) -> Manifest {
    let mut models = HashMap::new();
    for (name, table, compiled) in [
        ("stg_customers", "analytics.stg_customers", "select 1"),
        ("dim_customers", "analytics.dim_customers", compiled_dim),
    ] {
        models.insert(
            ModelName::new(name),
            ManifestModel {
                name: ModelName::new(name),
                table_name: Some(TableName::new(table)),
                path: Some(format!("models/{name}.sql")),
                tags: vec!["core".to_string()],
                documentation: None,
                compiled_sql: Some(compiled.to_string()),
            },
        );
    }
    Manifest {
        project_name: "jaffle".to_string(),
        compiled_at: "2026-01-01T00:00:00Z".to_string(),
        models,
    }
}

fn params<'a>(
    project: &Path,
    warehouse: &'a dyn Warehouse,
    generator: Option<&'a dyn TextGenerator>,
    manifest: Option<&'a Manifest>,
) -> ContextParams<'a> {
    ContextParams {
        project_name: "jaffle".to_string(),
        model_roots: vec![project.join("models")],
        artifact_root: project.join("context"),
        warehouse_schema: "analytics".to_string(),
        warehouse,
        generator,
        manifest,
        max_tokens: 1500,
        temperature: 0.3,
        business_context: None,
    }
}

struct StubGenerator {
    fail: bool,
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _system_prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> LlmResult<Generation> {
        if self.fail {
            Err(LlmError::Api {
                status: 429,
                message: "quota exceeded".into(),
            })
        } else {
            Ok(Generation {
                content: "Generated narrative.".into(),
                tokens: TokenUsage {
                    input_tokens: 200,
                    output_tokens: 80,
                },
            })
        }
    }

    fn model_name(&self) -> &str {
        "gpt-4o-mini"
    }
}

// --- build ---

#[tokio::test]
async fn test_build_writes_full_layout() {
    let project = project_fixture();
    let db = warehouse_fixture();
    let builder = ContextBuilder::new(params(project.path(), &db, None, None));

    let summary = builder.build(&BuildOptions::default()).await.unwrap();

    let root = project.path().join("context");
    assert!(root.join("system_prompt.md").is_file());
    assert!(root.join("summary.md").is_file());
    assert!(root.join("modelling.md").is_file());
    assert!(root.join("models/analytics_stg_customers.md").is_file());
    assert!(root.join("models/analytics_dim_customers.md").is_file());
    assert!(root.join(".cache/model-hashes.json").is_file());
    assert!(root.join(".cache/run_summary.json").is_file());

    // Every discovered table yields exactly one artifact
    assert_eq!(summary.total, 2);
    assert_eq!(summary.fallbacks, 2);
    assert_eq!(summary.failed, 0);

    let doc = fs::read_to_string(root.join("models/analytics_dim_customers.md")).unwrap();
    assert!(doc.contains("# analytics.dim_customers"));
    assert!(doc.contains("customer_id"));

    // The scanned graph reached the catalog
    let catalog = fs::read_to_string(root.join("modelling.md")).unwrap();
    assert!(catalog.contains("dim_customers"));
    assert!(catalog.contains("stg_customers"));
}

#[tokio::test]
async fn test_build_refuses_existing_dir_without_force() {
    let project = project_fixture();
    let db = warehouse_fixture();
    let builder = ContextBuilder::new(params(project.path(), &db, None, None));

    builder.build(&BuildOptions::default()).await.unwrap();
    let err = builder.build(&BuildOptions::default()).await.unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[tokio::test]
async fn test_forced_rebuild_is_byte_identical_for_fallbacks() {
    let project = project_fixture();
    let db = warehouse_fixture();
    let builder = ContextBuilder::new(params(project.path(), &db, None, None));

    builder.build(&BuildOptions::default()).await.unwrap();
    let doc_path = project
        .path()
        .join("context/models/analytics_dim_customers.md");
    let first = fs::read_to_string(&doc_path).unwrap();
    let first_summary = fs::read_to_string(project.path().join("context/summary.md")).unwrap();

    builder.build(&BuildOptions { force: true }).await.unwrap();
    assert_eq!(fs::read_to_string(&doc_path).unwrap(), first);
    assert_eq!(
        fs::read_to_string(project.path().join("context/summary.md")).unwrap(),
        first_summary
    );
}

#[tokio::test]
async fn test_build_with_succeeding_generator() {
    let project = project_fixture();
    let db = warehouse_fixture();
    let stub = StubGenerator { fail: false };
    let builder = ContextBuilder::new(params(
        project.path(),
        &db,
        Some(&stub as &dyn TextGenerator),
        None,
    ));

    let summary = builder.build(&BuildOptions::default()).await.unwrap();
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.fallbacks, 0);
    assert!(summary.cost_estimate > 0.0);

    let doc = fs::read_to_string(
        project
            .path()
            .join("context/models/analytics_dim_customers.md"),
    )
    .unwrap();
    assert_eq!(doc, "Generated narrative.");
}

#[tokio::test]
async fn test_generation_failure_still_writes_artifact() {
    let project = project_fixture();
    let db = warehouse_fixture();
    let stub = StubGenerator { fail: true };
    let builder = ContextBuilder::new(params(
        project.path(),
        &db,
        Some(&stub as &dyn TextGenerator),
        None,
    ));

    let summary = builder.build(&BuildOptions::default()).await.unwrap();
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.fallbacks, 2);

    let result = summary
        .results
        .iter()
        .find(|r| r.model_name == "dim_customers")
        .unwrap();
    assert!(!result.success);
    let error = result.error.as_ref().unwrap();
    assert!(error.fallback_used);
    assert!(error.message.contains("429"));

    // The artifact is still written and non-empty
    let doc = fs::read_to_string(
        project
            .path()
            .join("context/models/analytics_dim_customers.md"),
    )
    .unwrap();
    assert!(!doc.trim().is_empty());
    assert!(doc.contains("# analytics.dim_customers"));
}

// --- update ---

#[tokio::test]
async fn test_update_requires_existing_dir() {
    let project = project_fixture();
    let db = warehouse_fixture();
    let builder = ContextBuilder::new(params(project.path(), &db, None, None));

    let err = builder.update(&UpdateOptions::default()).await.unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[tokio::test]
async fn test_update_skips_unchanged_tables() {
    let project = project_fixture();
    let db = warehouse_fixture();
    let manifest = manifest_fixture("select * from stg_customers");
    let builder = ContextBuilder::new(params(project.path(), &db, None, Some(&manifest)));

    builder.build(&BuildOptions::default()).await.unwrap();
    let summary = builder.update(&UpdateOptions::default()).await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.fallbacks, 0);
}

#[tokio::test]
async fn test_update_reprofiles_on_logic_change() {
    let project = project_fixture();
    let db = warehouse_fixture();

    let manifest_v1 = manifest_fixture("select * from stg_customers");
    {
        let builder = ContextBuilder::new(params(project.path(), &db, None, Some(&manifest_v1)));
        builder.build(&BuildOptions::default()).await.unwrap();
    }

    // Compiled logic of dim_customers changes; stg_customers does not
    let manifest_v2 = manifest_fixture("select customer_id from stg_customers");
    let builder = ContextBuilder::new(params(project.path(), &db, None, Some(&manifest_v2)));
    let summary = builder.update(&UpdateOptions::default()).await.unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.fallbacks, 1);
    let reprofiled: Vec<_> = summary.results.iter().map(|r| &r.model_name).collect();
    assert_eq!(reprofiled, vec!["dim_customers"]);
}

#[tokio::test]
async fn test_update_with_selection_profiles_only_resolved_set() {
    let project = project_fixture();
    let db = warehouse_fixture();
    let manifest = manifest_fixture("select * from stg_customers");
    let builder = ContextBuilder::new(params(project.path(), &db, None, Some(&manifest)));

    // No prior build: create the directory by hand so everything is "new"
    fs::create_dir_all(project.path().join("context")).unwrap();

    let summary = builder
        .update(&UpdateOptions {
            profiles_only: true,
            selection: Some("+dim_customers".to_string()),
            exclude: vec!["stg_customers".to_string()],
        })
        .await
        .unwrap();

    assert_eq!(summary.total, 1);
    let profiled: Vec<_> = summary.results.iter().map(|r| &r.model_name).collect();
    assert_eq!(profiled, vec!["dim_customers"]);
}

#[tokio::test]
async fn test_update_unresolved_selection_falls_back_to_full_list() {
    let project = project_fixture();
    let db = warehouse_fixture();
    let manifest = manifest_fixture("select * from stg_customers");
    let builder = ContextBuilder::new(params(project.path(), &db, None, Some(&manifest)));

    fs::create_dir_all(project.path().join("context")).unwrap();

    let summary = builder
        .update(&UpdateOptions {
            profiles_only: true,
            selection: Some("unknown_model".to_string()),
            exclude: vec![],
        })
        .await
        .unwrap();

    // Conservative fallback: the full table list, not an empty one
    assert_eq!(summary.total, 2);
}

#[tokio::test]
async fn test_update_profiles_only_leaves_project_docs_alone() {
    let project = project_fixture();
    let db = warehouse_fixture();
    let builder = ContextBuilder::new(params(project.path(), &db, None, None));

    builder.build(&BuildOptions::default()).await.unwrap();
    let summary_path = project.path().join("context/summary.md");
    fs::write(&summary_path, "hand-inspected marker").unwrap();

    builder
        .update(&UpdateOptions {
            profiles_only: true,
            ..UpdateOptions::default()
        })
        .await
        .unwrap();
    assert_eq!(
        fs::read_to_string(&summary_path).unwrap(),
        "hand-inspected marker"
    );

    builder.update(&UpdateOptions::default()).await.unwrap();
    assert_ne!(
        fs::read_to_string(&summary_path).unwrap(),
        "hand-inspected marker"
    );
}

// --- failure isolation ---

/// Warehouse where schema introspection fails for one table and every
/// statistics query fails: profiling degrades per table, the run survives.
struct FlakyWarehouse {
    tables: Vec<(String, String)>,
}

#[async_trait]
impl Warehouse for FlakyWarehouse {
    async fn query(&self, sql: &str) -> DbResult<QueryResult> {
        Err(DbError::Query(format!("synthetic failure: {sql}")))
    }

    async fn get_table_schema(
        &self,
        _schema: &str,
        table: &str,
    ) -> DbResult<Vec<ds_core::ColumnDef>> {
        if table == "bad" {
            Err(DbError::Query("introspection failed".into()))
        } else {
            Ok(vec![ds_core::ColumnDef {
                name: "id".into(),
                data_type: "BIGINT".into(),
                nullable: false,
            }])
        }
    }

    async fn list_tables(&self, _schema: Option<&str>) -> DbResult<Vec<(String, String)>> {
        Ok(self.tables.clone())
    }

    fn warehouse_type(&self) -> &'static str {
        "flaky"
    }
}

#[tokio::test]
async fn test_per_table_failure_does_not_abort_run() {
    let project = project_fixture();
    let db = FlakyWarehouse {
        tables: vec![
            ("analytics".to_string(), "good".to_string()),
            ("analytics".to_string(), "bad".to_string()),
        ],
    };
    let builder = ContextBuilder::new(params(project.path(), &db, None, None));

    let summary = builder.build(&BuildOptions::default()).await.unwrap();

    // "good" profiles with absorbed query failures (zeroed statistics);
    // "bad" fails schema introspection entirely and yields no artifact.
    assert_eq!(summary.total, 2);
    assert_eq!(summary.fallbacks, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].model, "bad");
    assert!(!summary.errors[0].fallback_used);

    assert!(project
        .path()
        .join("context/models/analytics_good.md")
        .is_file());
    assert!(!project
        .path()
        .join("context/models/analytics_bad.md")
        .exists());
}

#[tokio::test]
async fn test_cache_records_written_after_build() {
    let project = project_fixture();
    let db = warehouse_fixture();
    let manifest = manifest_fixture("select * from stg_customers");
    let builder = ContextBuilder::new(params(project.path(), &db, None, Some(&manifest)));

    builder.build(&BuildOptions::default()).await.unwrap();

    let cache: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(project.path().join("context/.cache/model-hashes.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(cache["version"], "1");
    let dim = &cache["models"]["dim_customers"];
    assert_eq!(dim["warehouseTable"], "analytics.dim_customers");
    assert_eq!(dim["profilePath"], "models/analytics_dim_customers.md");
    assert!(dim["schemaHash"].as_str().unwrap().len() == 64);
    assert!(dim["logicHash"].as_str().unwrap().len() == 64);
}

#[tokio::test]
async fn test_invalid_selection_pattern_aborts() {
    let project = project_fixture();
    let db = warehouse_fixture();
    let builder = ContextBuilder::new(params(project.path(), &db, None, None));
    fs::create_dir_all(project.path().join("context")).unwrap();

    let err = builder
        .update(&UpdateOptions {
            profiles_only: true,
            selection: Some("tag:".to_string()),
            exclude: vec![],
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid selector"));
}
