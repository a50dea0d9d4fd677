use std::collections::HashSet;

use hopscope_core::class_of_label;
use serde::{Deserialize, Serialize};

use crate::CallGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub edge_records: usize,
    pub unique_edges: usize,
    pub distinct_methods: usize,
    pub distinct_classes: usize,
}

impl GraphSummary {
    pub fn of(graph: &CallGraph) -> Self {
        let classes: HashSet<&str> = graph.labels().map(class_of_label).collect();
        Self {
            edge_records: graph.edge_records(),
            unique_edges: graph.unique_edges(),
            distinct_methods: graph.node_count(),
            distinct_classes: classes.len(),
        }
    }
}
