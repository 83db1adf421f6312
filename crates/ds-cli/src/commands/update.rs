//! Incremental context update

use anyhow::{Context, Result};
use ds_agent::{ContextBuilder, ContextParams, UpdateOptions};
use ds_db::{DuckDbWarehouse, Warehouse};
use ds_llm::TextGenerator;

use crate::cli::{GlobalArgs, UpdateArgs};
use crate::commands::common::{create_generator, load_manifest, load_project, print_summary};

/// Execute the update command
pub(crate) async fn execute(args: &UpdateArgs, global: &GlobalArgs) -> Result<()> {
    let (root, config) = load_project(global)?;
    let manifest = load_manifest(&root, &config)?;
    let generator = create_generator(&config);

    let warehouse = DuckDbWarehouse::new(&config.warehouse.path)
        .context("Failed to connect to the warehouse")?;

    let params = ContextParams {
        project_name: config.name.clone(),
        model_roots: config.model_paths_absolute(&root),
        artifact_root: config.artifact_dir(&root),
        warehouse_schema: config.warehouse.schema.clone(),
        warehouse: &warehouse as &dyn Warehouse,
        generator: generator.as_ref().map(|g| g as &dyn TextGenerator),
        manifest: manifest.as_ref(),
        max_tokens: config.enrichment.max_tokens,
        temperature: config.enrichment.temperature,
        business_context: None,
    };

    println!("Updating context for '{}'...\n", config.name);
    let summary = ContextBuilder::new(params)
        .update(&UpdateOptions {
            profiles_only: args.profiles_only,
            selection: args.select.clone(),
            exclude: args.exclude.clone(),
        })
        .await?;
    print_summary(&summary);
    Ok(())
}
