//! List models matching a selection

use anyhow::Result;
use ds_core::{apply_selection, RefGraph, Selection};

use crate::cli::{GlobalArgs, LsArgs};
use crate::commands::common::{load_manifest, load_project, print_table, scan_models};

/// Execute the ls command
pub(crate) async fn execute(args: &LsArgs, global: &GlobalArgs) -> Result<()> {
    let (root, config) = load_project(global)?;
    let manifest = load_manifest(&root, &config)?;
    let graph = scan_models(&root, &config)?;
    let refs = RefGraph::build(&graph);

    let selection = Selection::parse(args.select.as_deref().unwrap_or(""), &args.exclude)?;
    let selected = apply_selection(&selection, &graph, &refs, manifest.as_ref());

    let rows: Vec<Vec<String>> = selected
        .iter()
        .filter_map(|name| graph.get(name))
        .map(|node| {
            vec![
                node.name.to_string(),
                node.refs.len().to_string(),
                node.sources.len().to_string(),
                node.rel_path.display().to_string(),
            ]
        })
        .collect();

    print_table(&["MODEL", "REFS", "SOURCES", "PATH"], &rows);
    println!("\n{} of {} models selected", rows.len(), graph.len());
    Ok(())
}
