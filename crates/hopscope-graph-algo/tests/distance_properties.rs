use std::collections::HashSet;

use hopscope_core::{EdgeRecord, Fragment, QueryOutcome};
use hopscope_graph_algo::{CallGraph, CallTreeQuery, DistanceMatrix, GraphOptions};
use proptest::prelude::*;

const LABELS: [&str; 8] = [
    "Main.main",
    "Parser.parse",
    "Parser$State.reset",
    "Lexer.next",
    "Lexer.peek",
    "Ast.build",
    "Ast$Node.visit",
    "Report.write",
];

fn edge_lists() -> impl Strategy<Value = Vec<EdgeRecord>> {
    prop::collection::vec((0..LABELS.len(), 0..LABELS.len()), 0..24).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(caller, callee)| EdgeRecord::new(LABELS[caller], LABELS[callee]))
            .collect()
    })
}

fn build(edges: &[EdgeRecord], options: GraphOptions) -> (CallGraph, DistanceMatrix) {
    let graph = CallGraph::build(edges, options).expect("build");
    let matrix = DistanceMatrix::compute(&graph);
    (graph, matrix)
}

proptest! {
    #[test]
    fn every_edge_label_is_indexed(edges in edge_lists(), directed in any::<bool>()) {
        let options = GraphOptions { directed, ..GraphOptions::default() };
        let (graph, matrix) = build(&edges, options);
        let labels: HashSet<&str> = edges
            .iter()
            .flat_map(|edge| [edge.caller.as_str(), edge.callee.as_str()])
            .collect();

        prop_assert_eq!(graph.node_count(), labels.len());
        for label in labels {
            let index = graph.index_of(label).expect("edge label indexed");
            prop_assert_eq!(graph.label(index), Some(label));
            prop_assert_eq!(matrix.distance(index, index), 0.0);
        }
    }

    #[test]
    fn diagonal_is_zero(edges in edge_lists()) {
        let (graph, matrix) = build(&edges, GraphOptions::default());
        for i in 0..graph.node_count() {
            prop_assert_eq!(matrix.distance(i, i), 0.0);
        }
    }

    #[test]
    fn direct_calls_are_one_hop(edges in edge_lists()) {
        let (graph, matrix) = build(&edges, GraphOptions::default());
        for edge in edges.iter().filter(|edge| !edge.is_self_loop()) {
            let caller = graph.index_of(&edge.caller).expect("caller indexed");
            let callee = graph.index_of(&edge.callee).expect("callee indexed");
            prop_assert_eq!(matrix.distance(caller, callee), 1.0);
        }
    }

    #[test]
    fn undirected_distances_are_symmetric(edges in edge_lists()) {
        let (graph, matrix) = build(&edges, GraphOptions::default());
        let n = graph.node_count();
        for i in 0..n {
            for j in 0..n {
                prop_assert_eq!(matrix.distance(i, j), matrix.distance(j, i));
            }
        }
    }

    #[test]
    fn triangle_inequality_holds(edges in edge_lists(), directed in any::<bool>()) {
        let options = GraphOptions { directed, ..GraphOptions::default() };
        let (graph, matrix) = build(&edges, options);
        let n = graph.node_count();
        for a in 0..n {
            for b in 0..n {
                for c in 0..n {
                    prop_assert!(
                        matrix.distance(a, c) <= matrix.distance(a, b) + matrix.distance(b, c)
                    );
                }
            }
        }
    }

    #[test]
    fn reconstructed_paths_are_valid(edges in edge_lists(), directed in any::<bool>()) {
        let options = GraphOptions { directed, ..GraphOptions::default() };
        let (graph, matrix) = build(&edges, options);
        let n = graph.node_count();
        for from in 0..n {
            for to in 0..n {
                let distance = matrix.distance(from, to);
                let path = matrix.path(from, to);
                if distance.is_infinite() {
                    prop_assert!(path.is_empty());
                    continue;
                }
                prop_assert_eq!(path.first().copied(), Some(from));
                prop_assert_eq!(path.last().copied(), Some(to));
                prop_assert_eq!(path.len(), distance as usize + 1);
                for window in path.windows(2) {
                    prop_assert!(graph.edge_weight(window[0], window[1]).is_some());
                }
            }
        }
    }

    #[test]
    fn matches_petgraph_dijkstra(edges in edge_lists(), directed in any::<bool>()) {
        let options = GraphOptions { directed, ..GraphOptions::default() };
        let (graph, matrix) = build(&edges, options);

        let mut reference = petgraph::graph::DiGraph::<&str, f64>::new();
        let nodes: Vec<_> = graph.labels().map(|label| reference.add_node(label)).collect();
        for from in 0..graph.node_count() {
            for to in 0..graph.node_count() {
                if let Some(weight) = graph.edge_weight(from, to) {
                    reference.add_edge(nodes[from], nodes[to], weight);
                }
            }
        }

        for (from, start) in nodes.iter().enumerate() {
            let reachable = petgraph::algo::dijkstra(&reference, *start, None, |edge| *edge.weight());
            for (to, node) in nodes.iter().enumerate() {
                match reachable.get(node) {
                    Some(expected) => prop_assert_eq!(matrix.distance(from, to), *expected),
                    None => prop_assert!(matrix.distance(from, to).is_infinite()),
                }
            }
        }
    }

    #[test]
    fn rebuilding_yields_identical_results(
        edges in edge_lists(),
        source in 0..LABELS.len(),
        destination in 0..LABELS.len(),
    ) {
        let source = Fragment::literal(LABELS[source]);
        let destination = Fragment::literal(LABELS[destination]);

        let first = CallTreeQuery::from_edges(&edges, GraphOptions::default())
            .expect("build")
            .shortest_path(&source, &destination)
            .expect("query");
        let second = CallTreeQuery::from_edges(&edges, GraphOptions::default())
            .expect("build")
            .shortest_path(&source, &destination)
            .expect("query");

        prop_assert_eq!(first, second);
    }
}

#[test]
fn inner_class_nodes_match_outer_fragment() {
    let edges = vec![EdgeRecord::new("Foo.bar", "Foo$Inner.bar")];
    let query = CallTreeQuery::from_edges(&edges, GraphOptions::default()).expect("build");

    let result = query
        .shortest_path(&Fragment::literal("Foo.bar"), &Fragment::literal("Foo.bar"))
        .expect("query");
    assert_eq!(result.distance, 0.0);
    assert_eq!(result.path, vec!["Foo.bar"]);

    let graph = query.graph();
    let pattern = hopscope_graph_algo::IdentifierPattern::compile(&Fragment::literal("Foo.bar"))
        .expect("compile");
    assert_eq!(graph.matches(&pattern).len(), 2);
}

#[test]
fn directed_mode_reports_reverse_calls_unreachable() {
    let edges = vec![EdgeRecord::new("A", "B"), EdgeRecord::new("B", "C")];
    let query = CallTreeQuery::from_edges(&edges, GraphOptions::directed()).expect("build");

    let forward = query
        .shortest_path(&Fragment::literal("A"), &Fragment::literal("C"))
        .expect("query");
    assert_eq!(forward.distance, 2.0);
    assert_eq!(forward.path, vec!["A", "B", "C"]);

    let backward = query
        .shortest_path(&Fragment::literal("C"), &Fragment::literal("A"))
        .expect("query");
    assert_eq!(backward.outcome, QueryOutcome::Unreachable);
    assert!(backward.path.is_empty());
}
