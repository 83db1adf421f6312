//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use ds_core::{Config, Manifest, ModelGraph, ModelNode};
use ds_llm::OpenAiGenerator;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Resolve the project root and load its configuration.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<(PathBuf, Config)> {
    let root = resolve_root(&global.project_dir)?;
    let config = Config::load_from_dir(&root).context("Failed to load project config")?;
    Ok((root, config))
}

fn resolve_root(dir: &str) -> Result<PathBuf> {
    let path = Path::new(dir);
    let root = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    anyhow::ensure!(root.exists(), "Project directory not found: {}", root.display());
    Ok(root)
}

/// Scan every configured model directory into one graph.
pub(crate) fn scan_models(root: &Path, config: &Config) -> Result<ModelGraph> {
    let mut nodes: Vec<ModelNode> = Vec::new();
    for dir in config.model_paths_absolute(root) {
        if !dir.exists() {
            log::warn!("Model directory missing: {}", dir.display());
            continue;
        }
        let graph = ds_core::scan_project(&dir)?;
        nodes.extend(graph.nodes().iter().cloned());
    }
    Ok(ModelGraph::from_nodes(nodes))
}

/// Load the compiled manifest when it exists.
pub(crate) fn load_manifest(root: &Path, config: &Config) -> Result<Option<Manifest>> {
    let path = config.manifest_path_absolute(root);
    let manifest = Manifest::load_optional(&path).context("Failed to load compiled manifest")?;
    if manifest.is_none() {
        log::debug!("No compiled manifest at {}", path.display());
    }
    Ok(manifest)
}

/// Create the generation client when enrichment is enabled.
///
/// A missing API key degrades to fallback-only operation with a warning
/// instead of aborting the run.
pub(crate) fn create_generator(config: &Config) -> Option<OpenAiGenerator> {
    if !config.enrichment.enabled {
        return None;
    }
    match OpenAiGenerator::from_env(&config.enrichment.base_url, &config.enrichment.model) {
        Ok(generator) => Some(generator),
        Err(e) => {
            log::warn!("Enrichment disabled: {e}");
            None
        }
    }
}

/// Print a run summary to stdout.
pub(crate) fn print_summary(summary: &ds_agent::ProfileSummary) {
    for result in &summary.results {
        let mark = if result.success {
            '\u{2713}'
        } else if result.fallback_used {
            '~'
        } else {
            '\u{2717}'
        };
        println!("  {} {} ({}ms)", mark, result.model_name, result.duration_ms);
    }
    for error in &summary.errors {
        println!("  ! {}: {}", error.model, error.message);
    }
    println!(
        "\nRun {}: {} tables ({} enriched, {} fallback, {} failed, {} skipped) in {}ms",
        summary.run_id,
        summary.total,
        summary.succeeded,
        summary.fallbacks,
        summary.failed,
        summary.skipped,
        summary.duration_ms
    );
    if summary.cost_estimate > 0.0 {
        println!("Estimated generation cost: ${:.4}", summary.cost_estimate);
    }
}

/// Calculate column widths for a table given headers and row data.
fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Print a formatted table to stdout: left-aligned header row, a dashed
/// separator, then the data rows, columns separated by two spaces.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  "));

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  "));
    }
}
