//! Prompt assembly for enrichment calls
//!
//! Statistics and declared metadata are serialized into a structured
//! plain-text prompt. The system prompt is fixed; per-call variation
//! lives entirely in the user prompt.

use ds_core::{ModelDocumentation, ModelGraph, TableStatisticsProfile};
use std::fmt::Write;

/// Fixed system prompt for all enrichment calls.
pub const SYSTEM_PROMPT: &str = "You are a data documentation assistant. \
You write concise, factual markdown documentation for warehouse tables \
based on observed statistics and declared metadata. Never invent columns \
or values that are not in the input. Keep output under the requested \
length and do not add preambles.";

/// Build the per-table enrichment prompt from statistics, optional
/// declared documentation, and optional business context.
pub fn build_table_prompt(
    profile: &TableStatisticsProfile,
    docs: Option<&ModelDocumentation>,
    business_context: Option<&str>,
) -> String {
    let mut p = String::new();
    writeln!(
        p,
        "Write markdown documentation for the table `{}`.",
        profile.qualified_name()
    )
    .unwrap();
    writeln!(p, "\n## Observed statistics").unwrap();
    writeln!(p, "- Row count: {}", profile.row_count).unwrap();
    if let Some(bytes) = profile.size_bytes {
        writeln!(p, "- Size: {} bytes", bytes).unwrap();
    }
    if let Some(range) = &profile.time_range {
        writeln!(
            p,
            "- Time range ({}): {} to {}",
            range.column, range.earliest, range.latest
        )
        .unwrap();
    }

    writeln!(p, "\n## Columns").unwrap();
    for col in &profile.columns {
        write!(p, "- `{}` {}", col.name, col.data_type).unwrap();
        if !col.nullable {
            write!(p, " NOT NULL").unwrap();
        }
        if let Some(d) = col.distinct_count {
            write!(p, ", {} distinct", d).unwrap();
        }
        if let Some(n) = col.null_percent {
            write!(p, ", {:.1}% null", n).unwrap();
        }
        if let (Some(min), Some(max)) = (&col.min, &col.max) {
            write!(p, ", range {min}..{max}").unwrap();
        }
        if !col.sample_values.is_empty() {
            write!(p, ", top values: {}", col.sample_values.join(", ")).unwrap();
        }
        writeln!(p).unwrap();
    }

    if let Some(docs) = docs {
        writeln!(p, "\n## Declared documentation").unwrap();
        if let Some(desc) = &docs.description {
            writeln!(p, "{desc}").unwrap();
        }
        for col in &docs.columns {
            if let Some(desc) = &col.description {
                writeln!(p, "- `{}`: {}", col.name, desc).unwrap();
            }
        }
    }

    if let Some(context) = business_context {
        writeln!(p, "\n## Business context").unwrap();
        writeln!(p, "{context}").unwrap();
    }

    writeln!(
        p,
        "\nProduce: a one-paragraph summary, a column table with \
         descriptions, and any notable data quality observations."
    )
    .unwrap();
    p
}

/// Build the project-summary prompt from the scanned graph.
pub fn build_summary_prompt(project_name: &str, graph: &ModelGraph) -> String {
    let mut p = String::new();
    writeln!(
        p,
        "Write a narrative project summary for the data project `{project_name}`."
    )
    .unwrap();
    writeln!(
        p,
        "It contains {} models with {} model references and {} external source references.",
        graph.len(),
        graph.ref_count,
        graph.source_count
    )
    .unwrap();
    writeln!(p, "\nModels:").unwrap();
    for node in graph.nodes() {
        writeln!(
            p,
            "- {} (refs: {}, sources: {})",
            node.name,
            node.refs.len(),
            node.sources.len()
        )
        .unwrap();
    }
    writeln!(
        p,
        "\nDescribe the project's layering and the flow of data from \
         sources to final models in a few paragraphs of markdown."
    )
    .unwrap();
    p
}

/// Build the model-catalog prompt from the scanned graph.
pub fn build_catalog_prompt(project_name: &str, graph: &ModelGraph) -> String {
    let mut p = String::new();
    writeln!(
        p,
        "Write a model catalog in markdown for the data project `{project_name}`."
    )
    .unwrap();
    writeln!(p, "\nModels and their declared dependencies:").unwrap();
    for node in graph.nodes() {
        let refs: Vec<&str> = node.refs.iter().map(|r| r.as_str()).collect();
        let sources: Vec<String> = node
            .sources
            .iter()
            .map(|s| format!("{}.{}", s.source, s.table))
            .collect();
        writeln!(
            p,
            "- {} | refs: [{}] | sources: [{}]",
            node.name,
            refs.join(", "),
            sources.join(", ")
        )
        .unwrap();
    }
    writeln!(
        p,
        "\nFor each model give one line: its role and what it depends on."
    )
    .unwrap();
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use ds_core::{ColumnStatistics, TimeRange};

    fn profile() -> TableStatisticsProfile {
        TableStatisticsProfile {
            schema: "analytics".into(),
            table: "orders".into(),
            row_count: 42,
            size_bytes: None,
            columns: vec![ColumnStatistics {
                name: "id".into(),
                data_type: "BIGINT".into(),
                nullable: false,
                distinct_count: Some(42),
                null_percent: Some(0.0),
                min: Some("1".into()),
                max: Some("42".into()),
                sample_values: vec!["1".into(), "2".into()],
            }],
            time_range: Some(TimeRange {
                column: "ordered_at".into(),
                earliest: "2026-01-01".into(),
                latest: "2026-02-01".into(),
            }),
        }
    }

    #[test]
    fn test_table_prompt_contains_observed_facts() {
        let p = build_table_prompt(&profile(), None, None);
        assert!(p.contains("`analytics.orders`"));
        assert!(p.contains("Row count: 42"));
        assert!(p.contains("`id` BIGINT NOT NULL"));
        assert!(p.contains("range 1..42"));
        assert!(p.contains("Time range (ordered_at)"));
    }

    #[test]
    fn test_table_prompt_optional_sections() {
        let docs = ModelDocumentation {
            description: Some("All orders".into()),
            columns: vec![],
        };
        let with = build_table_prompt(&profile(), Some(&docs), Some("Orders drive revenue."));
        assert!(with.contains("## Declared documentation"));
        assert!(with.contains("All orders"));
        assert!(with.contains("## Business context"));

        let without = build_table_prompt(&profile(), None, None);
        assert!(!without.contains("## Declared documentation"));
        assert!(!without.contains("## Business context"));
    }
}
