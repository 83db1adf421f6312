//! Full context build

use anyhow::{Context, Result};
use ds_agent::{BuildOptions, ContextBuilder, ContextParams};
use ds_db::{DuckDbWarehouse, Warehouse};
use ds_llm::TextGenerator;

use crate::cli::{BuildArgs, GlobalArgs};
use crate::commands::common::{create_generator, load_manifest, load_project, print_summary};

/// Execute the build command
pub(crate) async fn execute(args: &BuildArgs, global: &GlobalArgs) -> Result<()> {
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

    println!("Building context for '{}'...\n", config.name);
    let summary = ContextBuilder::new(params)
        .build(&BuildOptions { force: args.force })
        .await?;
    print_summary(&summary);
    Ok(())
}
