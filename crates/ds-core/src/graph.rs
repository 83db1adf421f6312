//! Reference graph over scanned models
//!
//! Unlike a build DAG, the reference graph is never validated for
//! acyclicity: it records whatever the scanner found, and traversal stays
//! safe on cyclic input because every walk carries a visited set.

use crate::model::ModelGraph;
use crate::name::ModelName;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet, VecDeque};

/// Directed graph of model references.
///
/// An edge `a -> b` means model `a` references (depends on) model `b`.
/// Upstream traversal follows edges; downstream traversal follows the
/// reverse direction.
#[derive(Debug, Default)]
pub struct RefGraph {
    graph: DiGraph<ModelName, ()>,
    node_map: HashMap<ModelName, NodeIndex>,
}

impl RefGraph {
    /// Build the reference graph from a scanned [`ModelGraph`].
    ///
    /// References to names that are not models (external tables, typos)
    /// produce no edge.
    pub fn build(models: &ModelGraph) -> Self {
        let mut rg = RefGraph::default();
        for node in models.nodes() {
            rg.add_node(&node.name);
        }
        for node in models.nodes() {
            for dep in &node.refs {
                if models.contains(dep) {
                    let from = rg.node_map[&node.name];
                    let to = rg.node_map[dep];
                    rg.graph.add_edge(from, to, ());
                }
            }
        }
        rg
    }

    fn add_node(&mut self, name: &ModelName) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(name) {
            idx
        } else {
            let idx = self.graph.add_node(name.clone());
            self.node_map.insert(name.clone(), idx);
            idx
        }
    }

    /// Check if a model exists in the graph.
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// The model plus everything it transitively references.
    pub fn upstream(&self, name: &str) -> Vec<ModelName> {
        self.traverse(name, petgraph::Direction::Outgoing)
    }

    /// The model plus everything that transitively references it.
    pub fn downstream(&self, name: &str) -> Vec<ModelName> {
        self.traverse(name, petgraph::Direction::Incoming)
    }

    /// Breadth-first walk from `name` in `direction`, inclusive of the
    /// start node. Each node is expanded at most once, so cycles and
    /// diamonds terminate.
    fn traverse(&self, name: &str, direction: petgraph::Direction) -> Vec<ModelName> {
        let Some(&start) = self.node_map.get(name) else {
            return Vec::new();
        };

        let mut result = vec![self.graph[start].clone()];
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            for edge in self.graph.edges_directed(current, direction) {
                let neighbor = match direction {
                    petgraph::Direction::Outgoing => edge.target(),
                    petgraph::Direction::Incoming => edge.source(),
                };
                if visited.insert(neighbor) {
                    result.push(self.graph[neighbor].clone());
                    queue.push_back(neighbor);
                }
            }
        }

        result
    }

    /// Direct references of a model (one hop upstream, exclusive).
    pub fn direct_refs(&self, name: &str) -> Vec<ModelName> {
        self.neighbors(name, petgraph::Direction::Outgoing)
    }

    /// Direct dependents of a model (one hop downstream, exclusive).
    pub fn direct_dependents(&self, name: &str) -> Vec<ModelName> {
        self.neighbors(name, petgraph::Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: petgraph::Direction) -> Vec<ModelName> {
        let Some(&idx) = self.node_map.get(name) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, direction)
            .map(|e| {
                let n = match direction {
                    petgraph::Direction::Outgoing => e.target(),
                    petgraph::Direction::Incoming => e.source(),
                };
                self.graph[n].clone()
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
