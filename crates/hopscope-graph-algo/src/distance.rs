use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::CallGraph;

/// Dense all-pairs distance and predecessor matrices.
///
/// `distance(i, j)` is `f64::INFINITY` when `j` is unreachable from `i`.
/// `predecessor(i, j)` is the node preceding `j` on a shortest path from
/// `i`, or `None` on the diagonal and for unreachable pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    len: usize,
    distances: Vec<f64>,
    predecessors: Vec<Option<usize>>,
}

impl DistanceMatrix {
    /// Floyd-Warshall over the adjacency of `graph`. The graph is not
    /// modified; undirected graphs already carry both directions.
    pub fn compute(graph: &CallGraph) -> Self {
        let n = graph.node_count();
        let mut distances = vec![f64::INFINITY; n * n];
        let mut predecessors = vec![None; n * n];

        for i in 0..n {
            distances[i * n + i] = 0.0;
        }

        for edge in graph.inner().edge_references() {
            let (from, to) = (edge.source().index(), edge.target().index());
            let weight = *edge.weight();
            if weight < distances[from * n + to] {
                distances[from * n + to] = weight;
                predecessors[from * n + to] = Some(from);
            }
        }

        for k in 0..n {
            for i in 0..n {
                let via = distances[i * n + k];
                if via.is_infinite() {
                    continue;
                }
                for j in 0..n {
                    let candidate = via + distances[k * n + j];
                    if candidate < distances[i * n + j] {
                        distances[i * n + j] = candidate;
                        predecessors[i * n + j] = predecessors[k * n + j];
                    }
                }
            }
        }

        debug!(nodes = n, "computed all-pairs distances");

        Self {
            len: n,
            distances,
            predecessors,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn distance(&self, from: usize, to: usize) -> f64 {
        if from >= self.len || to >= self.len {
            return f64::INFINITY;
        }
        self.distances[from * self.len + to]
    }

    pub fn predecessor(&self, from: usize, to: usize) -> Option<usize> {
        if from >= self.len || to >= self.len {
            return None;
        }
        self.predecessors[from * self.len + to]
    }

    /// Walks predecessors from `to` back to `from`. Returns the node
    /// indices from `from` to `to` inclusive, or an empty path when the
    /// pair is unreachable.
    pub fn path(&self, from: usize, to: usize) -> Vec<usize> {
        if self.distance(from, to).is_infinite() {
            return Vec::new();
        }

        let mut walk = Vec::new();
        let mut current = Some(to);
        while let Some(node) = current {
            walk.push(node);
            if node == from || walk.len() > self.len {
                break;
            }
            current = self.predecessor(from, node);
        }

        walk.reverse();
        walk
    }
}
