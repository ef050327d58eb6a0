//! Extends graph construction and analysis
//!
//! Builds a petgraph view of a [`LayerRegistry`] where an edge `child → parent`
//! means "child extends parent". Used to validate a whole registry up front,
//! to order layers parents-first, and to answer reverse lookups ("which layers
//! extend this one?").
//!
//! # Example
//!
//! ```
//! use salak_core::config::{ConfigLayer, LayerGraph, LayerRegistry};
//!
//! let registry = LayerRegistry::try_from(vec![
//!     ConfigLayer::new("react").with_extends(["es6"]),
//!     ConfigLayer::new("es6"),
//! ])?;
//!
//! let graph = LayerGraph::from_registry(&registry);
//! assert_eq!(graph.topological_order()?, vec!["es6", "react"]);
//! assert_eq!(graph.dependents("es6"), vec!["react"]);
//! # Ok::<(), salak_core::ConfigError>(())
//! ```

use super::registry::LayerRegistry;
use crate::error::ConfigError;
use petgraph::Direction;
use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// An `extends` entry naming a layer that is not registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownReference {
    /// Layer whose `extends` holds the reference
    pub layer: String,
    /// The unregistered name
    pub missing: String,
}

/// Directed graph of the `extends` relation
pub struct LayerGraph {
    /// Node = layer name, edge weight = position in the child's `extends`
    graph: DiGraph<String, usize>,
    node_map: HashMap<String, NodeIndex>,
    unknown: Vec<UnknownReference>,
}

impl LayerGraph {
    /// Build the graph for every layer in `registry`
    ///
    /// Nodes are added in registry order. References to unregistered layers
    /// are recorded instead of becoming edges.
    pub fn from_registry(registry: &LayerRegistry) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        for name in registry.names() {
            let idx = graph.add_node(name.to_string());
            node_map.insert(name.to_string(), idx);
        }

        let mut unknown = Vec::new();
        for layer in registry.layers() {
            let from = node_map[&layer.name];
            for (position, parent) in layer.extends.iter().enumerate() {
                match node_map.get(parent) {
                    Some(&to) => {
                        graph.add_edge(from, to, position);
                    }
                    None => unknown.push(UnknownReference {
                        layer: layer.name.clone(),
                        missing: parent.clone(),
                    }),
                }
            }
        }

        trace!(
            "Built extends graph with {} layers and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Self {
            graph,
            node_map,
            unknown,
        }
    }

    /// `extends` entries that name unregistered layers, in registry order
    pub fn unknown_references(&self) -> &[UnknownReference] {
        &self.unknown
    }

    /// Every cycle in the graph
    ///
    /// Each cycle starts at its earliest-registered layer and follows
    /// `extends` in listed order, the same order a resolution from that layer
    /// would walk.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || (scc.len() == 1 && self.graph.contains_edge(scc[0], scc[0]))
            })
            .map(|scc| self.ordered_cycle(&scc))
            .collect();

        cycles.sort_by_key(|cycle| {
            cycle
                .first()
                .and_then(|name| self.node_map.get(name))
                .map(|idx| idx.index())
        });
        cycles
    }

    /// Walk from the earliest member of a strongly connected component back to it
    fn ordered_cycle(&self, scc: &[NodeIndex]) -> Vec<String> {
        let members: HashSet<NodeIndex> = scc.iter().copied().collect();
        let Some(&start) = scc.iter().min() else {
            return Vec::new();
        };

        let mut seen = HashSet::from([start]);
        // (layer, its parents in `extends` order, next parent to try)
        let mut stack = vec![(start, self.parents_in_order(start), 0usize)];

        while let Some((_, parents, next)) = stack.last_mut() {
            let Some(&parent) = parents.get(*next) else {
                stack.pop();
                continue;
            };
            *next += 1;

            if parent == start {
                return stack
                    .iter()
                    .map(|(node, _, _)| self.graph[*node].clone())
                    .collect();
            }
            if members.contains(&parent) && seen.insert(parent) {
                stack.push((parent, self.parents_in_order(parent), 0));
            }
        }

        Vec::new()
    }

    /// Direct parents in `extends` order
    fn parents_in_order(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<(usize, NodeIndex)> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| (*edge.weight(), edge.target()))
            .collect();
        edges.sort_by_key(|(position, _)| *position);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    /// First problem in the registry, if any
    ///
    /// Unknown references are reported before cycles.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(reference) = self.unknown.first() {
            return Err(ConfigError::unknown_layer(
                &reference.missing,
                &reference.layer,
            ));
        }

        if let Some(cycle) = self.find_cycles().into_iter().next() {
            return Err(ConfigError::CyclicExtends { cycle });
        }

        Ok(())
    }

    /// Layers ordered so every parent comes before the layers extending it
    ///
    /// # Errors
    ///
    /// Returns `CyclicExtends` if the graph contains cycles.
    pub fn topological_order(&self) -> Result<Vec<String>, ConfigError> {
        match toposort(&self.graph, None) {
            Ok(sorted) => {
                let mut result: Vec<String> = sorted
                    .into_iter()
                    .map(|idx| self.graph[idx].clone())
                    .collect();
                // Edges point child → parent, so toposort yields children first
                result.reverse();
                Ok(result)
            }
            Err(_) => {
                let cycle = self.find_cycles().into_iter().next().unwrap_or_default();
                Err(ConfigError::CyclicExtends { cycle })
            }
        }
    }

    /// Layers that directly extend `name`
    pub fn dependents(&self, name: &str) -> Vec<&str> {
        let Some(&idx) = self.node_map.get(name) else {
            return Vec::new();
        };

        let mut dependents: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|edge| edge.source())
            .collect();
        dependents.sort();
        dependents.dedup();
        dependents
            .into_iter()
            .map(|source| self.graph[source].as_str())
            .collect()
    }

    /// Every layer reachable through `extends` from `name`, excluding itself
    pub fn ancestors(&self, name: &str) -> Vec<&str> {
        let Some(&idx) = self.node_map.get(name) else {
            return Vec::new();
        };

        let mut ancestors = Vec::new();
        let mut dfs = Dfs::new(&self.graph, idx);
        while let Some(node) = dfs.next(&self.graph) {
            if node != idx {
                ancestors.push(node);
            }
        }
        ancestors.sort();
        ancestors
            .into_iter()
            .map(|node| self.graph[node].as_str())
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::layer::ConfigLayer;

    fn graph_of(layers: Vec<ConfigLayer>) -> LayerGraph {
        LayerGraph::from_registry(&LayerRegistry::try_from(layers).unwrap())
    }

    #[test]
    fn test_edges_and_unknown_references() {
        let graph = graph_of(vec![
            ConfigLayer::new("a").with_extends(["b", "ghost"]),
            ConfigLayer::new("b"),
        ]);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(
            graph.unknown_references(),
            &[UnknownReference {
                layer: "a".to_string(),
                missing: "ghost".to_string(),
            }]
        );
        assert_eq!(graph.validate(), Err(ConfigError::unknown_layer("ghost", "a")));
    }

    #[test]
    fn test_topological_order_puts_parents_first() {
        let graph = graph_of(vec![
            ConfigLayer::new("salak").with_extends(["salak/error", "salak/general"]),
            ConfigLayer::new("salak/general").with_extends(["eslint:recommended"]),
            ConfigLayer::new("salak/error"),
            ConfigLayer::new("eslint:recommended"),
        ]);

        let order = graph.topological_order().unwrap();
        let pos = |name: &str| order.iter().position(|n| n == name).unwrap();

        assert!(pos("eslint:recommended") < pos("salak/general"));
        assert!(pos("salak/general") < pos("salak"));
        assert!(pos("salak/error") < pos("salak"));
    }

    #[test]
    fn test_find_cycles_ordered_from_earliest_layer() {
        let graph = graph_of(vec![
            ConfigLayer::new("ok"),
            ConfigLayer::new("a").with_extends(["ok", "c"]),
            ConfigLayer::new("b").with_extends(["a"]),
            ConfigLayer::new("c").with_extends(["b"]),
            ConfigLayer::new("self").with_extends(["self"]),
        ]);

        let cycles = graph.find_cycles();
        assert_eq!(
            cycles,
            vec![
                vec!["a".to_string(), "c".to_string(), "b".to_string()],
                vec!["self".to_string()],
            ]
        );
        assert_eq!(
            graph.validate(),
            Err(ConfigError::CyclicExtends {
                cycle: vec!["a".to_string(), "c".to_string(), "b".to_string()]
            })
        );
        assert!(graph.topological_order().is_err());
    }

    #[test]
    fn test_dependents_and_ancestors() {
        let graph = graph_of(vec![
            ConfigLayer::new("es6"),
            ConfigLayer::new("react").with_extends(["es6"]),
            ConfigLayer::new("node").with_extends(["es6", "es6"]),
            ConfigLayer::new("app").with_extends(["react"]),
        ]);

        assert_eq!(graph.dependents("es6"), vec!["react", "node"]);
        assert_eq!(graph.ancestors("app"), vec!["es6", "react"]);
        assert!(graph.ancestors("es6").is_empty());
        assert!(graph.dependents("missing").is_empty());
    }

    #[test]
    fn test_long_cycle_is_ordered_without_recursion() {
        let depth = 20_000;
        let layers = (0..depth)
            .map(|level| {
                ConfigLayer::new(format!("layer-{level}"))
                    .with_extends([format!("layer-{}", (level + 1) % depth)])
            })
            .collect();

        let cycles = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || graph_of(layers).find_cycles())
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), depth);
        assert_eq!(cycles[0][0], "layer-0");
        assert_eq!(cycles[0][1], "layer-1");
    }
}
