//! Evolution graph.
//!
//! Nodes are `(pokemon, form)` pairs, edges point from a record to the
//! record it evolves into. Rank queries walk evolution chains with a
//! worklist and assume the graph is acyclic; [`EvolutionGraph::detect_cycles`]
//! makes that assumption checkable.

use crate::catalog::{Catalog, Evolution, Pokemon};
use crate::error::RankError;
use log::warn;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// A record in the evolution graph.
pub type EvolutionNode = (u32, u32);

/// Directed graph of evolution edges.
///
/// # Examples
///
/// ```rust
/// use pvprank::evolution::EvolutionGraph;
///
/// let mut graph = EvolutionGraph::new();
/// graph.add_edge((1, 0), (2, 0));
/// assert!(graph.detect_cycles().is_ok());
///
/// graph.add_edge((2, 0), (1, 0));
/// assert!(graph.detect_cycles().is_err());
/// ```
pub struct EvolutionGraph {
    graph: DiGraph<EvolutionNode, ()>,
    node_map: HashMap<EvolutionNode, NodeIndex>,
}

impl EvolutionGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Build the graph of every species and form in a catalog.
    ///
    /// Edges to species missing from the catalog are skipped.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut graph = Self::new();
        for (&id, pokemon) in &catalog.pokemon {
            graph.add_node((id, 0));
            graph.add_edges(catalog, (id, 0), &pokemon.evolutions);
            for (&form, record) in &pokemon.forms {
                if form != 0 {
                    graph.add_node((id, form));
                    graph.add_edges(catalog, (id, form), &record.evolutions);
                }
            }
        }
        graph
    }

    fn add_edges(&mut self, catalog: &Catalog, from: EvolutionNode, evolutions: &[Evolution]) {
        for evolution in evolutions {
            match catalog.get(evolution.pokemon) {
                Some(target) => self.add_edge(from, resolve_node(evolution, target)),
                None => warn!(
                    "pokemon {} form {} evolves into unknown pokemon {}",
                    from.0, from.1, evolution.pokemon
                ),
            }
        }
    }

    /// Add a node if it doesn't exist, returning its index.
    pub fn add_node(&mut self, node: EvolutionNode) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&node) {
            idx
        } else {
            let idx = self.graph.add_node(node);
            self.node_map.insert(node, idx);
            idx
        }
    }

    /// Add an edge: `from` evolves into `to`.
    pub fn add_edge(&mut self, from: EvolutionNode, to: EvolutionNode) {
        let from_idx = self.add_node(from);
        let to_idx = self.add_node(to);
        self.graph.add_edge(from_idx, to_idx, ());
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Fail with the offending path if any evolution chain is cyclic.
    pub fn detect_cycles(&self) -> Result<(), RankError> {
        if !is_cyclic_directed(&self.graph) {
            return Ok(());
        }

        let mut visited = HashSet::new();
        let mut on_path = HashSet::new();
        for node in self.graph.node_indices() {
            if !visited.contains(&node) {
                let mut path = Vec::new();
                if let Some(cycle) = self.find_cycle(node, &mut visited, &mut on_path, &mut path) {
                    return Err(RankError::EvolutionCycle { path: cycle });
                }
            }
        }
        Err(RankError::EvolutionCycle { path: Vec::new() })
    }

    fn find_cycle(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        on_path: &mut HashSet<NodeIndex>,
        path: &mut Vec<EvolutionNode>,
    ) -> Option<Vec<EvolutionNode>> {
        visited.insert(node);
        on_path.insert(node);
        path.push(self.graph[node]);

        for next in self.graph.neighbors(node) {
            if !visited.contains(&next) {
                if let Some(cycle) = self.find_cycle(next, visited, on_path, path) {
                    return Some(cycle);
                }
            } else if on_path.contains(&next) {
                let target = self.graph[next];
                let start = path.iter().position(|step| *step == target).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(target);
                return Some(cycle);
            }
        }

        on_path.remove(&node);
        path.pop();
        None
    }
}

impl Default for EvolutionGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Forms missing from the target fall back to its species record.
fn resolve_node(evolution: &Evolution, target: &Pokemon) -> EvolutionNode {
    if evolution.form != 0 && target.forms.contains_key(&evolution.form) {
        (evolution.pokemon, evolution.form)
    } else {
        (evolution.pokemon, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalog_graph() {
        let catalog: Catalog = serde_json::from_value(json!({
            "pokemon": {
                "661": {"attack": 95, "defense": 80, "stamina": 128,
                        "evolutions": [{"pokemon": 662}]},
                "662": {"attack": 145, "defense": 110, "stamina": 158,
                        "evolutions": [{"pokemon": 663}, {"pokemon": 9999}]},
                "663": {"attack": 176, "defense": 155, "stamina": 186}
            }
        }))
        .unwrap();
        let graph = EvolutionGraph::from_catalog(&catalog);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.detect_cycles().is_ok());
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_cycle_path() {
        let mut graph = EvolutionGraph::new();
        graph.add_edge((1, 0), (2, 0));
        graph.add_edge((2, 0), (3, 5));
        graph.add_edge((3, 5), (2, 0));

        match graph.detect_cycles() {
            Err(RankError::EvolutionCycle { path }) => {
                assert_eq!(path.first(), path.last());
                assert!(path.contains(&(2, 0)));
                assert!(path.contains(&(3, 5)));
                assert!(!path.contains(&(1, 0)));
            }
            other => panic!("expected a cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_loop() {
        let mut graph = EvolutionGraph::new();
        graph.add_edge((7, 0), (7, 0));
        assert!(graph.detect_cycles().is_err());
    }

    #[test]
    fn test_form_targets() {
        let catalog: Catalog = serde_json::from_value(json!({
            "pokemon": {
                "1": {"attack": 10, "forms": {"5": {"evolutions": [{"pokemon": 2, "form": 7}]}}},
                "2": {"attack": 20, "forms": {"7": {"evolutions": [{"pokemon": 1, "form": 5}]}}}
            }
        }))
        .unwrap();
        assert!(matches!(
            catalog.validate(),
            Err(RankError::EvolutionCycle { .. })
        ));
    }
}
