use std::sync::OnceLock;

use hopscope_core::{EdgeRecord, Fragment, HopResult};

use crate::resolver::resolve_patterns;
use crate::{CallGraph, DistanceMatrix, GraphAlgoError, GraphOptions, GraphSummary, IdentifierPattern};

/// Entry point for hop-distance and membership queries on one call graph.
///
/// The distance matrix is computed on the first distance query and then
/// reused; membership queries never compute it.
#[derive(Debug)]
pub struct CallTreeQuery {
    graph: CallGraph,
    distances: OnceLock<DistanceMatrix>,
}

impl CallTreeQuery {
    pub fn new(graph: CallGraph) -> Self {
        Self {
            graph,
            distances: OnceLock::new(),
        }
    }

    pub fn from_edges(edges: &[EdgeRecord], options: GraphOptions) -> Result<Self, GraphAlgoError> {
        Ok(Self::new(CallGraph::build(edges, options)?))
    }

    pub fn graph(&self) -> &CallGraph {
        &self.graph
    }

    pub fn distances(&self) -> &DistanceMatrix {
        self.distances
            .get_or_init(|| DistanceMatrix::compute(&self.graph))
    }

    pub fn has_computed_distances(&self) -> bool {
        self.distances.get().is_some()
    }

    pub fn shortest_path(
        &self,
        source: &Fragment,
        destination: &Fragment,
    ) -> Result<HopResult, GraphAlgoError> {
        let source = IdentifierPattern::compile(source)?;
        let destination = IdentifierPattern::compile(destination)?;
        Ok(self.resolve(&source, &destination))
    }

    /// Distance between any member of `source_class` and any member of
    /// `destination_class`, inner classes included.
    pub fn class_distance(
        &self,
        source_class: &str,
        destination_class: &str,
    ) -> Result<HopResult, GraphAlgoError> {
        let source = IdentifierPattern::class(source_class)?;
        let destination = IdentifierPattern::class(destination_class)?;
        Ok(self.resolve(&source, &destination))
    }

    pub fn method_distance(
        &self,
        source_class: &str,
        source_method: &str,
        destination_class: &str,
        destination_method: &str,
    ) -> Result<HopResult, GraphAlgoError> {
        let source = IdentifierPattern::qualified(source_class, source_method)?;
        let destination = IdentifierPattern::qualified(destination_class, destination_method)?;
        Ok(self.resolve(&source, &destination))
    }

    pub fn resolve(
        &self,
        source: &IdentifierPattern,
        destination: &IdentifierPattern,
    ) -> HopResult {
        resolve_patterns(&self.graph, self.distances(), source, destination)
    }

    pub fn exists(&self, fragment: &Fragment) -> Result<bool, GraphAlgoError> {
        let pattern = IdentifierPattern::compile(fragment)?;
        Ok(self.graph.contains_match(&pattern))
    }

    pub fn class_exists(&self, class: &str) -> Result<bool, GraphAlgoError> {
        let pattern = IdentifierPattern::class(class)?;
        Ok(self.graph.contains_match(&pattern))
    }

    pub fn method_exists(&self, method: &str) -> Result<bool, GraphAlgoError> {
        let pattern = IdentifierPattern::method(method)?;
        Ok(self.graph.contains_match(&pattern))
    }

    /// True when any `class.method` combination from the two lists names a
    /// node in the call graph.
    pub fn class_method_exists<C, M>(
        &self,
        classes: &[C],
        methods: &[M],
    ) -> Result<bool, GraphAlgoError>
    where
        C: AsRef<str>,
        M: AsRef<str>,
    {
        for class in classes {
            for method in methods {
                let pattern = IdentifierPattern::qualified(class.as_ref(), method.as_ref())?;
                if self.graph.contains_match(&pattern) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary::of(&self.graph)
    }
}
