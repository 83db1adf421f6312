use super::*;
use crate::model::{ModelGraph, ModelNode};
use std::collections::BTreeMap;
use std::path::PathBuf;

fn node(name: &str, refs: &[&str]) -> ModelNode {
    ModelNode {
        name: ModelName::new(name),
        path: PathBuf::from(format!("/p/{name}.sql")),
        rel_path: PathBuf::from(format!("{name}.sql")),
        raw_text: String::new(),
        refs: refs.iter().map(|r| ModelName::new(*r)).collect(),
        sources: Vec::new(),
        config: BTreeMap::new(),
    }
}

fn graph(specs: &[(&str, &[&str])]) -> RefGraph {
    let nodes = specs.iter().map(|(n, r)| node(n, r)).collect();
    RefGraph::build(&ModelGraph::from_nodes(nodes))
}

fn names(mut v: Vec<ModelName>) -> Vec<String> {
    v.sort();
    v.into_iter().map(|n| n.into_inner()).collect()
}

#[test]
fn test_upstream_linear_chain() {
    let g = graph(&[
        ("stg_customers", &[]),
        ("dim_customers", &["stg_customers"]),
    ]);
    assert_eq!(
        names(g.upstream("dim_customers")),
        vec!["dim_customers", "stg_customers"]
    );
}

#[test]
fn test_downstream_linear_chain() {
    let g = graph(&[
        ("stg_customers", &[]),
        ("dim_customers", &["stg_customers"]),
    ]);
    assert_eq!(
        names(g.downstream("stg_customers")),
        vec!["dim_customers", "stg_customers"]
    );
}

#[test]
fn test_upstream_transitive() {
    let g = graph(&[
        ("raw_base", &[]),
        ("stg_orders", &["raw_base"]),
        ("fct_orders", &["stg_orders"]),
    ]);
    assert_eq!(
        names(g.upstream("fct_orders")),
        vec!["fct_orders", "raw_base", "stg_orders"]
    );
}

#[test]
fn test_diamond_visited_once() {
    // a depends on b and c; both depend on d
    let g = graph(&[
        ("d", &[]),
        ("b", &["d"]),
        ("c", &["d"]),
        ("a", &["b", "c"]),
    ]);
    let up = g.upstream("a");
    assert_eq!(up.len(), 4);
    assert_eq!(names(up), vec!["a", "b", "c", "d"]);
}

#[test]
fn test_cycle_terminates() {
    // A -> B -> A
    let g = graph(&[("a", &["b"]), ("b", &["a"])]);
    assert_eq!(names(g.upstream("a")), vec!["a", "b"]);
    assert_eq!(names(g.downstream("a")), vec!["a", "b"]);
}

#[test]
fn test_disconnected_node() {
    let g = graph(&[("island", &[]), ("a", &["b"]), ("b", &[])]);
    assert_eq!(names(g.upstream("island")), vec!["island"]);
    assert_eq!(names(g.downstream("island")), vec!["island"]);
}

#[test]
fn test_unknown_name_empty() {
    let g = graph(&[("a", &[])]);
    assert!(g.upstream("missing").is_empty());
    assert!(g.downstream("missing").is_empty());
}

#[test]
fn test_ref_to_non_model_produces_no_edge() {
    // "external_table" is referenced but never scanned as a model
    let g = graph(&[("a", &["external_table"])]);
    assert_eq!(names(g.upstream("a")), vec!["a"]);
}

#[test]
fn test_direct_neighbors() {
    let g = graph(&[
        ("raw_base", &[]),
        ("stg_orders", &["raw_base"]),
        ("fct_orders", &["stg_orders"]),
    ]);
    assert_eq!(names(g.direct_refs("fct_orders")), vec!["stg_orders"]);
    assert_eq!(names(g.direct_dependents("raw_base")), vec!["stg_orders"]);
}
