use std::collections::{HashMap, HashSet};

use hopscope_core::{DEFAULT_EDGE_WEIGHT, EdgeRecord, NodeLabel};
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::{GraphAlgoError, IdentifierPattern};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphOptions {
    /// Keep caller -> callee direction. When false every call contributes
    /// both traversal directions.
    pub directed: bool,
    /// Weight for records that carry none.
    pub default_weight: f64,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            directed: false,
            default_weight: DEFAULT_EDGE_WEIGHT,
        }
    }
}

impl GraphOptions {
    pub fn directed() -> Self {
        Self {
            directed: true,
            ..Self::default()
        }
    }
}

/// Indexed call graph for one analysis unit.
///
/// Node indices are dense, assigned in first-seen order over the edge
/// records, and the node weight is the label, so the petgraph index
/// doubles as the reverse index.
#[derive(Debug, Clone)]
pub struct CallGraph {
    graph: DiGraph<NodeLabel, f64>,
    index: HashMap<NodeLabel, NodeIndex>,
    directed: bool,
    edge_records: usize,
    self_loops: usize,
}

impl CallGraph {
    pub fn build(edges: &[EdgeRecord], options: GraphOptions) -> Result<Self, GraphAlgoError> {
        let mut call_graph = Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            directed: options.directed,
            edge_records: edges.len(),
            self_loops: 0,
        };
        let mut seen: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();

        for edge in edges {
            let weight = edge.weight_or(options.default_weight);
            if !weight.is_finite() || weight < 0.0 {
                return Err(GraphAlgoError::InvalidWeight {
                    caller: edge.caller.clone(),
                    callee: edge.callee.clone(),
                    weight,
                });
            }

            let caller = call_graph.intern(&edge.caller);
            if edge.is_self_loop() {
                call_graph.self_loops += 1;
                continue;
            }
            let callee = call_graph.intern(&edge.callee);

            if options.directed {
                if seen.insert((caller, callee)) {
                    call_graph.graph.add_edge(caller, callee, weight);
                }
                continue;
            }

            for (from, to) in [(caller, callee), (callee, caller)] {
                if seen.insert((from, to)) {
                    call_graph.graph.add_edge(from, to, weight);
                }
            }
        }

        debug!(
            nodes = call_graph.node_count(),
            adjacency_entries = call_graph.graph.edge_count(),
            edge_records = call_graph.edge_records,
            self_loops = call_graph.self_loops,
            directed = call_graph.directed,
            "built call graph"
        );

        Ok(call_graph)
    }

    fn intern(&mut self, label: &str) -> NodeIndex {
        if let Some(index) = self.index.get(label) {
            return *index;
        }
        let index = self.graph.add_node(label.to_owned());
        self.index.insert(label.to_owned(), index);
        index
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Number of records handed to [`CallGraph::build`], self loops included.
    pub fn edge_records(&self) -> usize {
        self.edge_records
    }

    pub fn self_loops(&self) -> usize {
        self.self_loops
    }

    /// Distinct calls kept after deduplication. In undirected mode a call
    /// and its reverse count once.
    pub fn unique_edges(&self) -> usize {
        if self.directed {
            self.graph.edge_count()
        } else {
            self.graph.edge_count() / 2
        }
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).map(|index| index.index())
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.graph
            .node_weight(NodeIndex::new(index))
            .map(String::as_str)
    }

    /// Labels in index order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph
            .node_indices()
            .map(move |index| self.graph[index].as_str())
    }

    pub fn edge_weight(&self, from: usize, to: usize) -> Option<f64> {
        if from >= self.node_count() || to >= self.node_count() {
            return None;
        }
        self.graph
            .find_edge(NodeIndex::new(from), NodeIndex::new(to))
            .and_then(|edge| self.graph.edge_weight(edge).copied())
    }

    /// Indices of every node whose label satisfies `pattern`, ascending.
    pub fn matches(&self, pattern: &IdentifierPattern) -> Vec<usize> {
        self.graph
            .node_indices()
            .filter(|index| pattern.is_match(&self.graph[*index]))
            .map(|index| index.index())
            .collect()
    }

    pub fn contains_match(&self, pattern: &IdentifierPattern) -> bool {
        self.labels().any(|label| pattern.is_match(label))
    }

    pub(crate) fn inner(&self) -> &DiGraph<NodeLabel, f64> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(caller: &str, callee: &str) -> EdgeRecord {
        EdgeRecord::new(caller, callee)
    }

    #[test]
    fn every_label_is_indexed_once() {
        let edges = vec![edge("A", "B"), edge("B", "C"), edge("C", "A"), edge("A", "C")];
        let graph = CallGraph::build(&edges, GraphOptions::default()).expect("build");

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.labels().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        for label in ["A", "B", "C"] {
            let index = graph.index_of(label).expect("indexed");
            assert_eq!(graph.label(index), Some(label));
        }
    }

    #[test]
    fn undirected_adjacency_is_symmetric_and_first_weight_wins() {
        let edges = vec![
            EdgeRecord::weighted("A", "B", 3.0),
            EdgeRecord::weighted("B", "A", 7.0),
            EdgeRecord::weighted("A", "B", 9.0),
        ];
        let graph = CallGraph::build(&edges, GraphOptions::default()).expect("build");

        let a = graph.index_of("A").expect("A");
        let b = graph.index_of("B").expect("B");
        assert_eq!(graph.edge_weight(a, b), Some(3.0));
        assert_eq!(graph.edge_weight(b, a), Some(3.0));
        assert_eq!(graph.unique_edges(), 1);
        assert_eq!(graph.edge_records(), 3);
    }

    #[test]
    fn directed_mode_keeps_call_direction() {
        let edges = vec![edge("A", "B"), edge("A", "B")];
        let graph = CallGraph::build(&edges, GraphOptions::directed()).expect("build");

        let a = graph.index_of("A").expect("A");
        let b = graph.index_of("B").expect("B");
        assert_eq!(graph.edge_weight(a, b), Some(1.0));
        assert_eq!(graph.edge_weight(b, a), None);
        assert_eq!(graph.unique_edges(), 1);
    }

    #[test]
    fn self_loops_are_dropped() {
        let edges = vec![edge("A", "A"), edge("A", "B")];
        let graph = CallGraph::build(&edges, GraphOptions::default()).expect("build");

        let a = graph.index_of("A").expect("A");
        assert_eq!(graph.edge_weight(a, a), None);
        assert_eq!(graph.self_loops(), 1);
        assert_eq!(graph.unique_edges(), 1);
    }

    #[test]
    fn label_seen_only_in_self_loop_is_still_a_node() {
        let edges = vec![edge("Main.main", "Parser.parse"), edge("Retry.loop", "Retry.loop")];
        let graph = CallGraph::build(&edges, GraphOptions::default()).expect("build");

        let retry = graph.index_of("Retry.loop").expect("self loop label indexed");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.label(retry), Some("Retry.loop"));
        assert_eq!(graph.edge_weight(retry, retry), None);
        assert_eq!(graph.self_loops(), 1);
        assert_eq!(graph.unique_edges(), 1);
    }

    #[test]
    fn negative_or_nan_weight_is_rejected() {
        for weight in [-1.0, f64::NAN, f64::INFINITY] {
            let edges = vec![EdgeRecord::weighted("A", "B", weight)];
            let err = CallGraph::build(&edges, GraphOptions::default()).expect_err("rejected");
            assert!(matches!(err, GraphAlgoError::InvalidWeight { .. }));
        }
    }

    #[test]
    fn default_weight_applies_to_unweighted_records() {
        let options = GraphOptions {
            directed: false,
            default_weight: 2.0,
        };
        let graph = CallGraph::build(&[edge("A", "B")], options).expect("build");
        assert_eq!(graph.edge_weight(0, 1), Some(2.0));
    }

    #[test]
    fn empty_edge_list_builds_empty_graph() {
        let graph = CallGraph::build(&[], GraphOptions::default()).expect("build");
        assert!(graph.is_empty());
        assert_eq!(graph.labels().count(), 0);
        assert_eq!(graph.edge_weight(0, 0), None);
    }

    #[test]
    fn matches_returns_indices_in_insertion_order() {
        let edges = vec![edge("Foo$Inner.bar", "Foo.bar"), edge("Foo.bar", "Baz.qux")];
        let graph = CallGraph::build(&edges, GraphOptions::default()).expect("build");
        let pattern = IdentifierPattern::class("Foo").expect("compile");

        assert_eq!(graph.matches(&pattern), vec![0, 1]);
        assert!(graph.contains_match(&pattern));
    }
}
