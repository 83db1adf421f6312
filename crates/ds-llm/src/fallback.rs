//! Deterministic fallback documentation
//!
//! Rendered purely from data already in hand — no network calls, no
//! clocks, no randomness. Running the renderer twice on identical input
//! yields byte-identical output, which is what makes forced rebuilds
//! idempotent when enrichment is unavailable.

use ds_core::{ModelDocumentation, ModelGraph, TableStatisticsProfile};
use std::fmt::Write;

/// Render the fallback document for one table.
pub fn render_table_fallback(
    profile: &TableStatisticsProfile,
    docs: Option<&ModelDocumentation>,
) -> String {
    let mut out = String::new();
    writeln!(out, "# {}", profile.qualified_name()).unwrap();
    writeln!(out).unwrap();

    if let Some(desc) = docs.and_then(|d| d.description.as_deref()) {
        writeln!(out, "{desc}").unwrap();
        writeln!(out).unwrap();
    }

    writeln!(out, "- Rows: {}", profile.row_count).unwrap();
    if let Some(bytes) = profile.size_bytes {
        writeln!(out, "- Size: {bytes} bytes").unwrap();
    }
    if let Some(range) = &profile.time_range {
        writeln!(
            out,
            "- Time range (`{}`): {} to {}",
            range.column, range.earliest, range.latest
        )
        .unwrap();
    }
    writeln!(out).unwrap();

    writeln!(out, "## Columns").unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "| Column | Type | Nullable | Distinct | Null % | Range | Top values |"
    )
    .unwrap();
    writeln!(out, "|---|---|---|---|---|---|---|").unwrap();
    for col in &profile.columns {
        let described = docs
            .and_then(|d| d.columns.iter().find(|c| c.name == col.name))
            .and_then(|c| c.description.as_deref());
        let distinct = col
            .distinct_count
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into());
        let null_pct = col
            .null_percent
            .map(|n| format!("{n:.1}"))
            .unwrap_or_else(|| "-".into());
        let range = match (&col.min, &col.max) {
            (Some(min), Some(max)) => format!("{min}..{max}"),
            _ => "-".into(),
        };
        let samples = if col.sample_values.is_empty() {
            "-".into()
        } else {
            col.sample_values.join(", ")
        };
        writeln!(
            out,
            "| `{}` | {} | {} | {} | {} | {} | {} |",
            col.name,
            col.data_type,
            if col.nullable { "yes" } else { "no" },
            distinct,
            null_pct,
            range,
            samples
        )
        .unwrap();
        if let Some(desc) = described {
            // Column descriptions follow the table so they survive
            // narrow rendering.
            writeln!(out, "\n`{}`: {}\n", col.name, desc).unwrap();
        }
    }

    out
}

/// Render the fallback project summary from the scanned graph.
pub fn render_summary_fallback(project_name: &str, graph: &ModelGraph) -> String {
    let mut out = String::new();
    writeln!(out, "# {project_name}").unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "This project declares {} transformation models with {} model \
         references and {} external source references.",
        graph.len(),
        graph.ref_count,
        graph.source_count
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(out, "## Models").unwrap();
    writeln!(out).unwrap();
    for node in graph.nodes() {
        writeln!(out, "- `{}` ({})", node.name, node.rel_path.display()).unwrap();
    }
    out
}

/// Render the fallback model catalog from the scanned graph.
pub fn render_catalog_fallback(project_name: &str, graph: &ModelGraph) -> String {
    let mut out = String::new();
    writeln!(out, "# Model catalog: {project_name}").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "| Model | References | Sources | Config |").unwrap();
    writeln!(out, "|---|---|---|---|").unwrap();
    for node in graph.nodes() {
        let refs: Vec<&str> = node.refs.iter().map(|r| r.as_str()).collect();
        let sources: Vec<String> = node
            .sources
            .iter()
            .map(|s| format!("{}.{}", s.source, s.table))
            .collect();
        let config: Vec<String> = node
            .config
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        writeln!(
            out,
            "| `{}` | {} | {} | {} |",
            node.name,
            dash_if_empty(refs.join(", ")),
            dash_if_empty(sources.join(", ")),
            dash_if_empty(config.join(", "))
        )
        .unwrap();
    }
    out
}

fn dash_if_empty(s: String) -> String {
    if s.is_empty() {
        "-".into()
    } else {
        s
    }
}
